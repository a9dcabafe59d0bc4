use thiserror::Error;

/// Error type that captures common expense-view failures.
#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid date `{input}`: {reason}")]
    InvalidDate { input: String, reason: String },
    #[error("Invalid start date: {0} (expected 1..=31)")]
    InvalidStartDay(u32),
    #[error("Validation failed: {0}")]
    Validation(String),
}
