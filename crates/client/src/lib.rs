//! fhir-client: typed client for FHIR REST servers
//!
//! Requests go out through [`FhirClient`]; every response is run through
//! [`interpret`], which decides whether the body is a Bundle, an
//! OperationOutcome or a single resource, decodes the first two, and maps
//! the status code onto [`Error`].
//!
//! ```rust,no_run
//! use fhir_client::{ClientConfig, FhirClient, error};
//! use fhir_core::Patient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FhirClient::new(&ClientConfig::new("http://localhost:8080/fhir"))?;
//! match client.get_by_id::<Patient>("42").await {
//!     Ok(patient) => println!("{:?}", patient.name),
//!     Err(e) if error::is_not_found(&e) => println!("no such patient"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod response;

pub use client::FhirClient;
pub use config::ClientConfig;
pub use editor::RequestEditor;
pub use error::{Error, Result};
pub use response::{Interpretation, MatchedKind, NormalizedResponse, RawResponse, interpret};
