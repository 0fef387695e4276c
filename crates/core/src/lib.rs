//! fhir-core: Shared FHIR R4 types and utilities
//!
//! This crate provides the resource shapes used by the FHIR client,
//! including Bundle, OperationOutcome, CapabilityStatement and a handful of
//! clinical resources, plus the registry that decodes a resource by name.

pub mod bundle;
pub mod capability;
pub mod datatypes;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod resources;

pub use bundle::{
    Bundle, BundleEntry, BundleEntryResponse, BundleEntrySearch, BundleLink, BundleType,
    SearchEntryMode,
};
pub use capability::{CapabilityResource, CapabilityRest, CapabilityStatement};
pub use datatypes::{
    CodeableConcept, Coding, HumanName, Identifier, Meta, Narrative, Quantity, Reference,
};
pub use error::{FhirError, Result};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use registry::{AnyResource, Resource, ResourceType, TypeDescriptor};
pub use resources::{Encounter, Observation, Organization, Patient, Practitioner};
