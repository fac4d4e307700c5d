pub mod controllers;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod repositories;
pub mod router;
pub mod state;

#[cfg(test)]
pub mod test_support;
