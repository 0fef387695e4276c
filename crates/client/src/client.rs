//! Async FHIR REST client

use fhir_core::{AnyResource, Bundle, CapabilityStatement, Resource, ResourceType};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::config::ClientConfig;
use crate::editor::{self, RequestEditor};
use crate::error::{Error, Result};
use crate::response::{Interpretation, JSON_CONTENT_TYPE, NormalizedResponse, RawResponse, interpret};

/// Client for a FHIR server's REST API
#[derive(Clone)]
pub struct FhirClient {
    http: reqwest::Client,
    base_url: String,
    editors: Vec<RequestEditor>,
}

impl FhirClient {
    /// Create a client from configuration.
    ///
    /// Credentials in the configuration are installed as the first editors.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("Invalid client configuration: {}", e)))?;
        let mut client = Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            editors: Vec::new(),
        };

        if let Some(key) = &config.api_key {
            client = client.with_editor(editor::api_key(key.clone()));
        }
        if let Some(token) = &config.bearer_token {
            client = client.with_editor(editor::bearer_token(token.clone()));
        }

        Ok(client)
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env())
    }

    /// Append an editor, run after the ones already installed
    pub fn with_editor(mut self, editor: RequestEditor) -> Self {
        self.editors.push(editor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /metadata
    pub async fn capabilities(&self) -> Result<CapabilityStatement> {
        let request = self
            .request(Method::GET, &["metadata"])?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.decode()
    }

    /// GET /{type}/{id}
    pub async fn read<T: Resource>(&self, id: &str) -> Result<T> {
        let request = self
            .request(Method::GET, &[T::RESOURCE_TYPE.as_str(), id])?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.decode()
    }

    /// GET /{type}/{id}, decoded as whatever the server returned
    pub async fn read_dynamic(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<Box<dyn AnyResource>> {
        let request = self
            .request(Method::GET, &[resource_type.as_str(), id])?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.decode_dynamic()
    }

    /// GET /{type}/{id}/_history/{version}
    pub async fn vread<T: Resource>(&self, id: &str, version: &str) -> Result<T> {
        let request = self
            .request(
                Method::GET,
                &[T::RESOURCE_TYPE.as_str(), id, "_history", version],
            )?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.decode()
    }

    /// POST /{type}
    pub async fn create<T: Resource>(&self, resource: &T) -> Result<NormalizedResponse> {
        let body = serde_json::to_vec(resource).map_err(Error::Serialization)?;
        let request = self
            .request(Method::POST, &[T::RESOURCE_TYPE.as_str()])?
            .body(body)
            .build()
            .map_err(invalid_request)?;
        self.send(request).await
    }

    /// PUT /{type}/{id}
    pub async fn update<T: Resource>(&self, id: &str, resource: &T) -> Result<NormalizedResponse> {
        let body = serde_json::to_vec(resource).map_err(Error::Serialization)?;
        let request = self
            .request(Method::PUT, &[T::RESOURCE_TYPE.as_str(), id])?
            .body(body)
            .build()
            .map_err(invalid_request)?;
        self.send(request).await
    }

    /// DELETE /{type}/{id}
    pub async fn delete(&self, resource_type: ResourceType, id: &str) -> Result<NormalizedResponse> {
        let request = self
            .request(Method::DELETE, &[resource_type.as_str(), id])?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await
    }

    /// GET /{type}?params
    pub async fn search(
        &self,
        resource_type: ResourceType,
        params: &[(&str, &str)],
    ) -> Result<Bundle> {
        let request = self
            .request(Method::GET, &[resource_type.as_str()])?
            .query(params)
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.into_bundle()
    }

    /// GET /{type}/{id}/_history
    pub async fn history(&self, resource_type: ResourceType, id: &str) -> Result<Bundle> {
        let request = self
            .request(Method::GET, &[resource_type.as_str(), id, "_history"])?
            .build()
            .map_err(invalid_request)?;
        self.send(request).await?.into_bundle()
    }

    /// Search by `_id` and require exactly one match.
    ///
    /// Zero matches is [`Error::NotFound`], more than one is
    /// [`Error::Cardinality`].
    pub async fn get_by_id<T: Resource>(&self, id: &str) -> Result<T> {
        let resource_type = T::RESOURCE_TYPE;
        let bundle = self.search(resource_type, &[("_id", id)]).await?;

        let mut matches = bundle.matches_of(resource_type);
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry.decode::<T>()?),
            (None, _) => Err(Error::NotFound {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
            }),
            (Some(_), Some(_)) => Err(Error::Cardinality {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                count: bundle.matches_of(resource_type).count(),
            }),
        }
    }

    /// Send a request and fail unless it succeeded.
    ///
    /// A 2xx response without a body is accepted even when it carries no
    /// JSON content type, as servers answer `204 No Content` to a delete.
    pub async fn send(&self, request: reqwest::Request) -> Result<NormalizedResponse> {
        accept(self.execute(request).await?)
    }

    /// Run editors, send the request and interpret the response.
    ///
    /// `Err` means no usable response exists: an editor failed or the
    /// transport did. Every HTTP-level failure is reported through
    /// [`Interpretation::error`] next to the response.
    pub async fn execute(&self, mut request: reqwest::Request) -> Result<Interpretation> {
        for edit in &self.editors {
            edit(&mut request)?;
        }

        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "Sending FHIR request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, %method, %url, "FHIR request failed");
                return Err(Error::Transport(e));
            }
        };

        let interpretation = interpret(RawResponse::read(response).await?);
        if let Some(err) = &interpretation.error {
            tracing::warn!(
                status = interpretation.response.status,
                error = %err,
                %method,
                %url,
                "FHIR request returned an error"
            );
        }

        Ok(interpretation)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<reqwest::RequestBuilder> {
        let mut url = self.base_url.clone();
        for segment in segments {
            if matches!(*segment, "" | "." | "..") || segment.contains(&['/', '?', '#'][..]) {
                return Err(Error::InvalidRequest(format!(
                    "Invalid path segment: '{}'",
                    segment
                )));
            }
            url.push('/');
            url.push_str(segment);
        }

        Ok(self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE))
    }
}

fn accept(interpretation: Interpretation) -> Result<NormalizedResponse> {
    let Interpretation { response, error } = interpretation;
    match error {
        Some(Error::UnexpectedContentType { .. })
            if response.is_success() && response.raw_body.is_empty() =>
        {
            Ok(response)
        }
        Some(err) => Err(err),
        None => Ok(response),
    }
}

fn invalid_request(err: reqwest::Error) -> Error {
    Error::InvalidRequest(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn client() -> FhirClient {
        FhirClient::new(&ClientConfig::new("http://fhir.example.org/r4/")).unwrap()
    }

    #[test]
    fn builds_urls_under_base() {
        let request = client()
            .request(Method::GET, &["Patient", "42", "_history", "3"])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://fhir.example.org/r4/Patient/42/_history/3"
        );
        assert_eq!(request.headers()[ACCEPT], JSON_CONTENT_TYPE);
        assert_eq!(request.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }

    #[test]
    fn rejects_ids_that_escape_the_path() {
        let client = client();

        for id in ["", ".", "..", "42/_history", "42?x=1", "a#b"] {
            let err = client.request(Method::GET, &["Patient", id]).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "id {:?}", id);
        }
    }

    #[test]
    fn unparseable_base_url_is_not_a_transport_error() {
        let client = FhirClient::new(&ClientConfig::new("not a url")).unwrap();

        let err = client
            .request(Method::GET, &["Patient", "1"])
            .unwrap()
            .build()
            .map_err(invalid_request)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(!crate::error::is_transport(&err));
    }

    #[test]
    fn bodiless_success_is_accepted() {
        let no_content = interpret(RawResponse::new(204, HeaderMap::new(), Vec::new()));
        assert!(crate::error::is_unexpected_content_type(
            no_content.error.as_ref().unwrap()
        ));
        assert_eq!(accept(no_content).unwrap().status, 204);

        let bare_error = interpret(RawResponse::new(500, HeaderMap::new(), Vec::new()));
        assert!(crate::error::is_unexpected_content_type(
            &accept(bare_error).unwrap_err()
        ));

        let html = interpret(RawResponse::with_content_type(
            200,
            HeaderValue::from_static("text/html"),
            "<html></html>",
        ));
        assert!(accept(html).is_err());
    }

    #[test]
    fn config_credentials_become_editors() {
        let config = ClientConfig::new("http://localhost")
            .with_api_key("k")
            .with_bearer_token("t");

        assert_eq!(FhirClient::new(&config).unwrap().editors.len(), 2);
        assert!(client().editors.is_empty());
    }
}
