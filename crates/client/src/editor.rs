//! Request editors.
//!
//! An editor mutates an outgoing request right before it is sent. Editors
//! run in the order they were added and the first failure aborts the call.

use std::sync::Arc;

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use uuid::Uuid;

use crate::error::{Error, Result};

pub type RequestEditor = Arc<dyn Fn(&mut Request) -> Result<()> + Send + Sync>;

/// Wrap a closure as an editor
pub fn editor<F>(f: F) -> RequestEditor
where
    F: Fn(&mut Request) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Set a header, replacing any previous value
pub fn header(name: HeaderName, value: impl Into<String>) -> RequestEditor {
    set_header(name, value.into(), false)
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(token: impl Into<String>) -> RequestEditor {
    set_header(AUTHORIZATION, format!("Bearer {}", token.into()), true)
}

/// `X-API-Key: <key>`
pub fn api_key(key: impl Into<String>) -> RequestEditor {
    set_header(HeaderName::from_static("x-api-key"), key.into(), true)
}

/// Fresh `X-Request-Id` per request
pub fn request_id() -> RequestEditor {
    editor(|request| {
        let id = Uuid::new_v4().to_string();
        let value = HeaderValue::from_str(&id)
            .map_err(|e| Error::InvalidRequest(format!("Invalid request id: {}", e)))?;
        request
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
        Ok(())
    })
}

fn set_header(name: HeaderName, value: String, sensitive: bool) -> RequestEditor {
    editor(move |request| {
        let mut header_value = HeaderValue::from_str(&value).map_err(|e| {
            Error::InvalidRequest(format!("Invalid value for header {}: {}", name, e))
        })?;
        header_value.set_sensitive(sensitive);
        request.headers_mut().insert(name.clone(), header_value);
        Ok(())
    })
}
