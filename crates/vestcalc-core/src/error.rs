use thiserror::Error;

#[derive(Debug, Error)]
pub enum VestCalcError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl VestCalcError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        VestCalcError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VestCalcError {
    fn from(e: serde_json::Error) -> Self {
        VestCalcError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for VestCalcError {
    fn from(e: std::io::Error) -> Self {
        VestCalcError::Storage(e.to_string())
    }
}
