//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex EntityApiErrorKind::RecordNotFound
///  * Errors related to violating the review item state machine.
#[derive(Debug)]
pub struct Error {
    // Underlying error, when one exists
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Record not found
    RecordNotFound,
    // Operation attempted on a review item not in the required source state,
    // or on an item with an async operation already in flight
    InvalidStateTransition,
    // Input data failed validation rules
    ValidationError,
    // Other errors
    Other,
}

impl Error {
    pub fn record_not_found() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }

    pub fn invalid_state_transition() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::InvalidStateTransition,
        }
    }

    pub fn validation(msg: String) -> Self {
        Error {
            source: Some(msg.into()),
            error_kind: EntityApiErrorKind::ValidationError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
