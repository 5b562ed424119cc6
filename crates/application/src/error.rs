use retouch_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("not an image: {file_name} ({media_type})")]
    NotAnImage {
        file_name: String,
        media_type: String,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("encode error: {0}")]
    Encode(String),
}

impl ApplicationError {
    /// Message shown to the user when this error surfaces in the editor.
    pub fn notice(&self) -> String {
        match self {
            Self::NotAnImage { .. } => "Please select a valid image file.".to_string(),
            other => other.to_string(),
        }
    }
}
