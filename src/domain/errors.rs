use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remote call that produced a `DomainError::Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Detect,
    Weather,
    Satellite,
    Alert,
    Feedback,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Detect => "detection",
            Operation::Weather => "weather fetch",
            Operation::Satellite => "satellite fetch",
            Operation::Alert => "alert",
            Operation::Feedback => "feedback",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid input: {0}")]
    Validation(String),
    /// Opaque beyond the failing operation; `detail` is for logs only.
    #[error("{operation} failed")]
    Request { operation: Operation, detail: String },
    #[error("geolocation unavailable: {0}")]
    GeolocationUnavailable(String),
    #[error("cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },
    #[error("no image selected")]
    NoImage,
}

impl DomainError {
    pub fn request(operation: Operation, detail: impl Into<String>) -> Self {
        DomainError::Request { operation, detail: detail.into() }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            DomainError::Request { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_hides_detail_from_display() {
        let err = DomainError::request(Operation::Detect, "HTTP 500: stack trace");
        assert_eq!(err.to_string(), "detection failed");
        assert_eq!(err.operation(), Some(Operation::Detect));
    }

    #[test]
    fn transition_error_names_phase_and_action() {
        let err = DomainError::InvalidTransition { from: "detecting", action: "start detection" };
        assert_eq!(err.to_string(), "cannot start detection while detecting");
        assert!(err.operation().is_none());
    }
}
