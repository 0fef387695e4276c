//! Response interpretation.
//!
//! [`interpret`] turns one raw HTTP response into a [`NormalizedResponse`]
//! and, when the call failed, an [`Error`]. The two travel together: a 404
//! carrying a well-formed OperationOutcome still exposes the decoded outcome.
//!
//! The steps run in a fixed order:
//!
//! 1. Content-type gate. A response not tagged as JSON is never parsed,
//!    whatever its status.
//! 2. Read the `resourceType` discriminant.
//! 3. Decode a Bundle or an OperationOutcome. Any other resource stays raw
//!    for the caller to decode as the type it asked for.
//! 4. Classify the status code.

use std::borrow::Cow;

use fhir_core::registry::{self, AnyResource, Resource};
use fhir_core::{Bundle, FhirError, OperationOutcome, ResourceType};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use crate::classify;
use crate::error::{Error, Result};

/// Media type sent on every request and expected on every response
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Response as received from the transport, body fully read
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Response with an `application/json` content type
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with_content_type(status, HeaderValue::from_static(JSON_CONTENT_TYPE), body)
    }

    pub fn with_content_type(
        status: u16,
        content_type: HeaderValue,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Self::new(status, headers, body)
    }

    /// Consume a transport response, reading its body to the end
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::Transport)?;

        Ok(Self::new(status, headers, body.to_vec()))
    }
}

/// Shape of the payload, decided by its `resourceType` alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedKind {
    Bundle,
    OperationOutcome,
    SingleResource,
    Unclassified,
}

impl MatchedKind {
    pub fn from_discriminant(resource_type: &str) -> Self {
        match resource_type {
            "" => MatchedKind::Unclassified,
            "Bundle" => MatchedKind::Bundle,
            "OperationOutcome" => MatchedKind::OperationOutcome,
            _ => MatchedKind::SingleResource,
        }
    }
}

/// A response after interpretation
#[derive(Debug, Clone)]
pub struct NormalizedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// `resourceType` found in the body, empty when there was none
    pub resource_type: String,
    pub raw_body: Vec<u8>,
    pub matched_kind: MatchedKind,
    pub bundle: Option<Bundle>,
    pub operation_outcome: Option<OperationOutcome>,
}

impl NormalizedResponse {
    fn new(status: u16, content_type: Option<String>, raw_body: Vec<u8>) -> Self {
        Self {
            status,
            content_type,
            resource_type: String::new(),
            raw_body,
            matched_kind: MatchedKind::Unclassified,
            bundle: None,
            operation_outcome: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, for logs and diagnostics
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_body)
    }

    /// Decode the raw body as `T`.
    ///
    /// Fails when the body names a different `resourceType`.
    pub fn decode<T: Resource>(&self) -> Result<T> {
        let expected = T::RESOURCE_TYPE;
        if !self.resource_type.is_empty() && self.resource_type != expected.as_str() {
            return Err(Error::ResourceTypeMismatch {
                expected,
                found: self.resource_type.clone(),
            });
        }
        self.decode_as(expected.as_str())
    }

    /// Decode the raw body as whatever type its `resourceType` names
    pub fn decode_dynamic(&self) -> Result<Box<dyn AnyResource>> {
        let descriptor = registry::describe(&self.resource_type)?;

        descriptor.decode(&self.raw_body).map_err(|err| match err {
            FhirError::Decode { source, .. } => self.decode_error(&self.resource_type, source),
            other => Error::Model(other),
        })
    }

    /// The decoded Bundle, or an error naming what came back instead
    pub fn into_bundle(self) -> Result<Bundle> {
        match self.bundle {
            Some(bundle) => Ok(bundle),
            None => Err(Error::ResourceTypeMismatch {
                expected: ResourceType::Bundle,
                found: self.resource_type,
            }),
        }
    }

    fn decode_as<T: DeserializeOwned>(&self, resource_type: &str) -> Result<T> {
        serde_json::from_slice(&self.raw_body)
            .map_err(|source| self.decode_error(resource_type, source))
    }

    fn decode_error(&self, resource_type: &str, source: serde_json::Error) -> Error {
        Error::Decode {
            resource_type: resource_type.to_string(),
            body: self.raw_body.clone(),
            source,
        }
    }
}

/// A normalized response together with the failure it signals, if any
#[derive(Debug)]
pub struct Interpretation {
    pub response: NormalizedResponse,
    pub error: Option<Error>,
}

impl Interpretation {
    fn failed(response: NormalizedResponse, error: Error) -> Self {
        Self {
            response,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the response on failure
    pub fn into_result(self) -> Result<NormalizedResponse> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.response),
        }
    }
}

/// Interpret a response whose body has already been read
pub fn interpret(raw: RawResponse) -> Interpretation {
    let RawResponse {
        status,
        headers,
        body,
    } = raw;
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut response = NormalizedResponse::new(status, content_type, body);

    if !is_json(response.content_type.as_deref()) {
        let error = Error::UnexpectedContentType {
            content_type: response.content_type.clone().unwrap_or_default(),
            status,
        };
        return Interpretation::failed(response, error);
    }

    response.resource_type = classify::resource_type(&response.raw_body);
    response.matched_kind = MatchedKind::from_discriminant(&response.resource_type);

    let mut message = String::new();
    match response.matched_kind {
        MatchedKind::Bundle => match response.decode_as::<Bundle>("Bundle") {
            Ok(bundle) => response.bundle = Some(bundle),
            Err(err) => return Interpretation::failed(response, err),
        },
        MatchedKind::OperationOutcome => {
            match response.decode_as::<OperationOutcome>("OperationOutcome") {
                Ok(outcome) => response.operation_outcome = Some(outcome),
                Err(err) => return Interpretation::failed(response, err),
            }
        }
        MatchedKind::SingleResource => {}
        MatchedKind::Unclassified => {
            message = classify::string_at(&response.raw_body, &["message"]);
        }
    }

    tracing::debug!(
        status,
        resource_type = %response.resource_type,
        kind = ?response.matched_kind,
        "Interpreted FHIR response"
    );

    let error = status_error(&response, message);
    Interpretation { response, error }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

fn status_error(response: &NormalizedResponse, message: String) -> Option<Error> {
    let status = response.status;
    match status {
        200..=299 => None,
        400..=499 => {
            let outcome_text = response
                .operation_outcome
                .as_ref()
                .map(OperationOutcome::display_text)
                .unwrap_or_default();

            let message = if !outcome_text.is_empty() {
                outcome_text
            } else if !message.is_empty() {
                message
            } else {
                status_line(status)
            };

            Some(Error::Domain {
                status,
                message,
                outcome: response.operation_outcome.clone().map(Box::new),
            })
        }
        _ => Some(Error::Server {
            status,
            message: status_line(status),
        }),
    }
}

/// `"404 (Not Found)"`
fn status_line(status: u16) -> String {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status");
    format!("{} ({})", status, reason)
}
