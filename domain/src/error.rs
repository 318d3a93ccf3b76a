//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: `domain` is dependent on `entity_api`, and `web` is dependent on
/// `domain`, but `web` should not be dependent, directly, on `entity_api`. Ultimately
/// the various `error_kind`s are used by `web` to return appropriate HTTP status codes
/// and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Store(StoreErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of store errors that can bubble up from the
/// entity layer (`entity_api` and `entity`). These errors are translated from the
/// `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum StoreErrorKind {
    NotFound,
    /// Operation attempted on a review item not in the required source state,
    /// or while another operation holds the item's mutation lock.
    InvalidTransition,
    Validation,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// The AI gateway call errored or returned unusable (empty) content.
    Gateway(String),
    /// The remote knowledge store returned a structurally invalid payload.
    MalformedPayload(String),
    Other(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Error {
            source: Some(msg.into()),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Store(
                StoreErrorKind::Validation,
            )),
        }
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Gateway(msg.into())),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let store_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => StoreErrorKind::NotFound,
            EntityApiErrorKind::InvalidStateTransition => StoreErrorKind::InvalidTransition,
            EntityApiErrorKind::ValidationError => StoreErrorKind::Validation,
            EntityApiErrorKind::Other => StoreErrorKind::Other("EntityApiErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Store(store_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}
