//! Builds an [`OAuthContext`] from an inbound HTTP request (provider side).

use std::sync::Arc;

use url::Url;

use crate::context::OAuthContext;
use crate::encoding::{parse_authorization_header, parse_form_encoded, url_decode};
use crate::error::Error;
use crate::parameters::ParameterCollection;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Transport-neutral view of a received HTTP request.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    /// Absolute request URL including the query string.
    pub url: String,
    pub headers: ParameterCollection,
    pub body: Option<Vec<u8>>,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First header value with a case-insensitive name match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

type UriAdjuster = Arc<dyn Fn(Url) -> Url + Send + Sync>;

/// Turns inbound requests into contexts ready for inspection.
#[derive(Clone, Default)]
pub struct OAuthContextBuilder {
    uri_adjuster: Option<UriAdjuster>,
}

impl OAuthContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite every request URL before parsing, e.g. to restore the public
    /// host behind a reverse proxy.
    #[must_use]
    pub fn with_uri_adjuster(
        mut self,
        adjuster: impl Fn(Url) -> Url + Send + Sync + 'static,
    ) -> Self {
        self.uri_adjuster = Some(Arc::new(adjuster));
        self
    }

    /// Context for `method` on `url` with no headers or body.
    pub fn from_url(&self, method: &str, url: &str) -> Result<OAuthContext, Error> {
        let mut context = OAuthContext::new();
        context.set_raw_uri(self.clean_url(url)?);
        context.set_request_method(method);
        Ok(context)
    }

    /// Context for a full inbound request.
    ///
    /// Cookies, form parameters (for form-encoded bodies) and the
    /// `Authorization` header are parsed into their collections.
    pub fn from_request(&self, request: &InboundRequest) -> Result<OAuthContext, Error> {
        let mut context = self.from_url(&request.method, &request.url)?;
        context.headers = request.headers.clone();

        if let Some(cookie_header) = request.header("Cookie") {
            context.cookies = parse_cookies(cookie_header);
        }

        let content_type = request.header("Content-Type").unwrap_or_default();
        if let Some(body) = &request.body {
            if content_type.to_ascii_lowercase().contains(FORM_CONTENT_TYPE) {
                context.form_encoded_parameters =
                    parse_form_encoded(&String::from_utf8_lossy(body));
            }
            if !body.is_empty() {
                context.raw_content = Some(body.clone());
            }
        }
        if !content_type.is_empty() {
            context.raw_content_type = Some(content_type.to_owned());
        }

        if let Some(authorization) = request.header("Authorization") {
            context
                .authorization_header_parameters
                .extend(parse_authorization_header(authorization));
            context.use_authorization_header = true;
        }

        Ok(context)
    }

    /// Apply the adjuster and drop a trailing `&` some platforms append.
    fn clean_url(&self, url: &str) -> Result<Url, Error> {
        let mut parsed = Url::parse(url)?;
        if let Some(adjuster) = &self.uri_adjuster {
            parsed = adjuster(parsed);
        }
        if parsed.as_str().ends_with('&') {
            let trimmed = parsed.as_str().trim_end_matches('&').to_owned();
            parsed = Url::parse(&trimmed)?;
        }
        Ok(parsed)
    }
}

impl std::fmt::Debug for OAuthContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthContextBuilder")
            .field("uri_adjuster", &self.uri_adjuster.is_some())
            .finish()
    }
}

/// Parse a `Cookie` header: `;`-separated `name=value` pairs without
/// whitespace. Values are URL-decoded with spaces restored to `+`.
fn parse_cookies(header: &str) -> ParameterCollection {
    header
        .split(';')
        .map(str::trim)
        .filter_map(|cookie| cookie.split_once('='))
        .filter(|(name, value)| {
            !name.contains(char::is_whitespace) && !value.contains(char::is_whitespace)
        })
        .map(|(name, value)| (name.to_owned(), url_decode(value).replace(' ', "+")))
        .collect()
}
