use crate::registry::ResourceType;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, FhirError>;

/// Errors raised while mapping JSON onto FHIR resource shapes
#[derive(Debug, Error)]
pub enum FhirError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Expected resourceType '{expected}', got '{found}'")]
    TypeMismatch {
        expected: ResourceType,
        found: String,
    },

    #[error("Bundle entry has no resource")]
    MissingResource,

    #[error("Failed to decode {resource_type}: {source}")]
    Decode {
        resource_type: ResourceType,
        #[source]
        source: serde_json::Error,
    },
}
