//! HTTP transport for signed consumer requests.

use std::time::Duration;

use oauth1_core::ParameterCollection;
use ureq::{Agent, RequestBuilder};
use url::Url;

use crate::error::ConsumerError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Everything needed to send a signed request.
#[derive(Debug, Clone)]
pub struct RequestDescription {
    pub url: Url,
    pub method: String,
    pub content_type: Option<String>,
    /// Form-encoded or text body.
    pub body: Option<String>,
    /// Raw byte body, used when `body` is unset.
    pub raw_body: Option<Vec<u8>>,
    pub headers: ParameterCollection,
}

impl RequestDescription {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            url,
            method: method.into(),
            content_type: None,
            body: None,
            raw_body: None,
            headers: ParameterCollection::new(),
        }
    }

    /// Bytes to send, empty when the request has no body.
    pub fn body_bytes(&self) -> &[u8] {
        match (&self.body, &self.raw_body) {
            (Some(body), _) => body.as_bytes(),
            (None, Some(raw)) => raw,
            (None, None) => &[],
        }
    }
}

/// Response status and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Sends request descriptions over HTTP.
///
/// Error statuses are returned as responses, not errors.
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response body
    /// cannot be read.
    fn execute(&self, request: &RequestDescription) -> Result<TransportResponse, ConsumerError>;
}

/// [`Transport`] backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT))
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &RequestDescription) -> Result<TransportResponse, ConsumerError> {
        let url = request.url.as_str();
        let body = request.body_bytes();

        let response = match request.method.as_str() {
            "GET" => send_without_body(with_headers(self.agent.get(url), request), body)?,
            "HEAD" => send_without_body(with_headers(self.agent.head(url), request), body)?,
            "DELETE" => send_without_body(with_headers(self.agent.delete(url), request), body)?,
            "OPTIONS" => send_without_body(with_headers(self.agent.options(url), request), body)?,
            "POST" => with_headers(self.agent.post(url), request).send(body)?,
            "PUT" => with_headers(self.agent.put(url), request).send(body)?,
            "PATCH" => with_headers(self.agent.patch(url), request).send(body)?,
            other => return Err(ConsumerError::UnsupportedMethod(other.to_owned())),
        };

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();
        let body = body_reader.read_to_string()?;
        Ok(TransportResponse { status, body })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &RequestDescription) -> RequestBuilder<B> {
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }
    if let Some(content_type) = &request.content_type {
        builder = builder.header("Content-Type", content_type);
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<ureq::typestate::WithoutBody>,
    body: &[u8],
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    if body.is_empty() {
        builder.call()
    } else {
        builder.force_send_body().send(body)
    }
}
