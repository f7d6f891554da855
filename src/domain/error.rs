use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Error text reported by the server, shown verbatim
    #[error("{0}")]
    Server(String),

    #[error("Failed to fetch info")]
    Rejected,

    /// Transport or decoding failure; the detail is only logged
    #[error("An unexpected error occurred.")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Could not decode image: {0}")]
    Image(String),
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => AppError::Server(message),
            ApiError::Rejected { .. } => AppError::Rejected,
            other => AppError::Network(other.to_string()),
        }
    }
}
