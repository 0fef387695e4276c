//! Client error taxonomy.
//!
//! Every failure of a FHIR call is an [`Error`]. Calling code branches on
//! the kind with the `is_*` predicates, which search the whole `source()`
//! chain, so they keep working after the error was wrapped by another error
//! type or by an `anyhow` context.

use std::error::Error as StdError;

use fhir_core::{FhirError, OperationOutcome, ResourceType};
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// FHIR client errors
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a usable response
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not tagged as JSON
    #[error("Unexpected content type '{content_type}' (status {status})")]
    UnexpectedContentType { content_type: String, status: u16 },

    /// 4xx response
    #[error("Request failed with status {status}: {message}")]
    Domain {
        status: u16,
        message: String,
        outcome: Option<Box<OperationOutcome>>,
    },

    /// Any other non-2xx response
    #[error("Server error: {message}")]
    Server { status: u16, message: String },

    /// A Bundle or OperationOutcome (or a requested resource) did not decode
    #[error("Failed to decode {resource_type} response: {source}")]
    Decode {
        resource_type: String,
        body: Vec<u8>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{resource_type}/{id} not found")]
    NotFound { resource_type: String, id: String },

    #[error("Expected exactly one {resource_type} with id '{id}', found {count}")]
    Cardinality {
        resource_type: String,
        id: String,
        count: usize,
    },

    #[error("Expected resourceType '{expected}', got '{found}'")]
    ResourceTypeMismatch {
        expected: ResourceType,
        found: String,
    },

    #[error(transparent)]
    Model(#[from] FhirError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),
}

impl Error {
    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedContentType { status, .. }
            | Error::Domain { status, .. }
            | Error::Server { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// OperationOutcome returned with a 4xx response
    pub fn operation_outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Error::Domain { outcome, .. } => outcome.as_deref(),
            _ => None,
        }
    }

    /// Diagnostic text chosen for a 4xx or 5xx response
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Domain { message, .. } | Error::Server { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// First [`Error`] in the cause chain of `err`, starting with `err` itself
pub fn find<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Error> {
    std::iter::successors(Some(err), |&e| e.source()).find_map(|e| e.downcast_ref::<Error>())
}

fn any_in_chain(err: &(dyn StdError + 'static), pred: impl Fn(&Error) -> bool) -> bool {
    std::iter::successors(Some(err), |&e| e.source())
        .filter_map(|e| e.downcast_ref::<Error>())
        .any(pred)
}

/// A lookup helper found no matching resource.
///
/// A plain 404 from the server is a [`Error::Domain`] and does not count.
pub fn is_not_found(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, Error::is_not_found)
}

pub fn is_cardinality(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::Cardinality { .. }))
}

pub fn is_domain(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::Domain { .. }))
}

pub fn is_server(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::Server { .. }))
}

pub fn is_unexpected_content_type(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::UnexpectedContentType { .. }))
}

pub fn is_transport(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::Transport(_)))
}

pub fn is_decode(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| matches!(e, Error::Decode { .. }))
}

pub fn is_unknown_resource_type(err: &(dyn StdError + 'static)) -> bool {
    any_in_chain(err, |e| {
        matches!(e, Error::Model(FhirError::UnknownResourceType(_)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Wrapper standing in for an application error type
    #[derive(Debug, Error)]
    #[error("loading chart failed")]
    struct ChartError {
        #[source]
        source: Error,
    }

    #[derive(Debug, Error)]
    #[error("request handler failed")]
    struct HandlerError {
        #[source]
        source: ChartError,
    }

    fn not_found() -> Error {
        Error::NotFound {
            resource_type: "Patient".to_string(),
            id: "42".to_string(),
        }
    }

    #[test]
    fn not_found_direct() {
        let err = not_found();

        assert!(is_not_found(&err));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Patient/42 not found");
    }

    #[test]
    fn not_found_through_wrappers() {
        let err = HandlerError {
            source: ChartError { source: not_found() },
        };

        assert!(is_not_found(&err));
        assert!(matches!(find(&err), Some(Error::NotFound { id, .. }) if id == "42"));
    }

    #[test]
    fn not_found_through_anyhow_context() {
        let err = anyhow::Error::new(not_found())
            .context("fetching patient")
            .context("rendering summary");

        assert!(is_not_found(err.as_ref()));
        assert!(!is_domain(err.as_ref()));
    }

    #[test]
    fn other_kinds_are_not_not_found() {
        let domain_404 = Error::Domain {
            status: 404,
            message: "Patient not found".to_string(),
            outcome: None,
        };
        let cardinality = Error::Cardinality {
            resource_type: "Patient".to_string(),
            id: "42".to_string(),
            count: 2,
        };
        let io = std::io::Error::other("disk on fire");

        assert!(!is_not_found(&domain_404));
        assert!(!is_not_found(&cardinality));
        assert!(!is_not_found(&io));
        assert!(find(&io).is_none());

        assert!(is_domain(&domain_404));
        assert!(is_cardinality(&cardinality));
    }

    #[test]
    fn status_accessor() {
        let server = Error::Server {
            status: 503,
            message: "503 (Service Unavailable)".to_string(),
        };

        assert_eq!(server.status(), Some(503));
        assert_eq!(server.message(), Some("503 (Service Unavailable)"));
        assert_eq!(not_found().status(), None);
        assert!(is_server(&server));
    }

    #[test]
    fn model_errors_are_identifiable() {
        let err: Error = FhirError::UnknownResourceType("Spaceship".to_string()).into();

        assert!(is_unknown_resource_type(&err));
        assert_eq!(err.to_string(), "Unknown resource type: Spaceship");
    }
}
