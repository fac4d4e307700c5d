#[derive(Debug)]
pub enum ApplicationError {
    /// Client error; the message is returned to the caller as-is.
    BadRequest(String),
    FileTooLarge,
    UnsupportedMediaType(String),
    Unauthorized,
    NotFound,
    InternalError(String),
    DatabaseError(String),
}

pub const NO_FILE_UPLOADED: &str = "No file uploaded";
pub const NO_FILES_UPLOADED: &str = "No files uploaded";

impl From<crate::domain::models::filter::FilterError> for ApplicationError {
    fn from(error: crate::domain::models::filter::FilterError) -> Self {
        ApplicationError::BadRequest(error.to_string())
    }
}
