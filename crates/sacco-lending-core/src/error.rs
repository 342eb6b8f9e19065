use thiserror::Error;

#[derive(Debug, Error)]
pub enum LendingError {
    #[error("Invalid loan parameters: {field}: {reason}")]
    InvalidLoanParameters { field: String, reason: String },

    #[error("Invalid lending policy: {field}: {reason}")]
    InvalidPolicy { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LendingError {
    fn from(e: serde_json::Error) -> Self {
        LendingError::SerializationError(e.to_string())
    }
}
