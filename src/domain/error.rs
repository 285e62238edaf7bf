use thiserror::Error;
use time::Date;

/// Rule violations raised by the pure domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },
    #[error("{message}")]
    Forbidden { message: String },
    #[error("goal window must start before it ends (start {start}, end {end})")]
    EmptyWindow { start: Date, end: Date },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}
