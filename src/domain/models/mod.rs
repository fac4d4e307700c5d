pub mod file;
pub mod filter;
pub mod property;
