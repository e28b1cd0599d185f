//! The per-request OAuth parameter model.
//!
//! An [`OAuthContext`] carries every parameter of one request: the bound
//! protocol parameters (consumer key, nonce, signature and so on), the raw
//! query, form, header and cookie collections, and the request line. Both
//! the consumer (when signing) and the provider (when verifying) work on it.

use std::fmt;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use sha1::{Digest, Sha1};
use url::Url;

use crate::encoding::{
    format_query_string, normalize_request_parameters, normalize_url, parse_form_encoded,
    url_encode,
};
use crate::error::{Error, OAuthError};
use crate::parameters::{ParameterCollection, names};

/// Protocol version written by signers.
pub const OAUTH_VERSION: &str = "1.0";

/// Collection a bound protocol parameter is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    AuthorizationHeader,
    Query,
    Form,
}

/// Parameters of a single OAuth request.
#[derive(Debug, Clone, Default)]
pub struct OAuthContext {
    /// Parameters parsed from or destined for the `Authorization` header.
    pub authorization_header_parameters: ParameterCollection,
    pub query_parameters: ParameterCollection,
    pub form_encoded_parameters: ParameterCollection,
    /// Transport headers (not protocol parameters).
    pub headers: ParameterCollection,
    pub cookies: ParameterCollection,
    pub raw_content: Option<Vec<u8>>,
    pub raw_content_type: Option<String>,
    /// Write protocol parameters to the `Authorization` header.
    pub use_authorization_header: bool,
    /// Compute `oauth_body_hash` from the raw content before building the
    /// signature base.
    pub include_body_hash_in_signature: bool,
    request_method: Option<String>,
    raw_uri: Option<Url>,
    normalized_request_url: Option<String>,
}

macro_rules! bound_parameters {
    ($($getter:ident, $setter:ident => $name:expr;)*) => {
        impl OAuthContext {
            $(
                pub fn $getter(&self) -> Option<&str> {
                    self.bound_parameter($name)
                }

                pub fn $setter(&mut self, value: &str) {
                    self.set_bound_parameter($name, value);
                }
            )*
        }
    };
}

bound_parameters! {
    body_hash, set_body_hash => names::OAUTH_BODY_HASH;
    callback_url, set_callback_url => names::OAUTH_CALLBACK;
    consumer_key, set_consumer_key => names::OAUTH_CONSUMER_KEY;
    nonce, set_nonce => names::OAUTH_NONCE;
    session_handle, set_session_handle => names::OAUTH_SESSION_HANDLE;
    signature, set_signature => names::OAUTH_SIGNATURE;
    signature_method, set_signature_method => names::OAUTH_SIGNATURE_METHOD;
    timestamp, set_timestamp => names::OAUTH_TIMESTAMP;
    token, set_token => names::OAUTH_TOKEN;
    token_secret, set_token_secret => names::OAUTH_TOKEN_SECRET;
    verifier, set_verifier => names::OAUTH_VERIFIER;
    version, set_version => names::OAUTH_VERSION;
    x_auth_mode, set_x_auth_mode => names::X_AUTH_MODE;
    x_auth_password, set_x_auth_password => names::X_AUTH_PASSWORD;
    x_auth_username, set_x_auth_username => names::X_AUTH_USERNAME;
}

impl OAuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for `method` on `url`.
    pub fn for_request(method: &str, url: &str) -> Result<Self, Error> {
        let mut context = Self::new();
        context.set_request_method(method);
        context.set_raw_url(url)?;
        Ok(context)
    }

    pub fn request_method(&self) -> Option<&str> {
        self.request_method.as_deref()
    }

    /// Set the HTTP method (stored upper-cased).
    pub fn set_request_method(&mut self, method: &str) {
        self.request_method = (!method.is_empty()).then(|| method.to_ascii_uppercase());
    }

    pub fn raw_uri(&self) -> Option<&Url> {
        self.raw_uri.as_ref()
    }

    /// Set the request URL.
    ///
    /// Its query string is merged into [`query_parameters`](Self::query_parameters)
    /// and the normalized request URL is derived from it.
    pub fn set_raw_uri(&mut self, uri: Url) {
        let parsed = parse_form_encoded(uri.query().unwrap_or_default());
        for (key, _) in parsed.iter() {
            self.query_parameters.remove(key);
        }
        self.query_parameters.extend(parsed);
        self.normalized_request_url = Some(normalize_url(&uri));
        self.raw_uri = Some(uri);
    }

    pub fn set_raw_url(&mut self, url: &str) -> Result<(), Error> {
        self.set_raw_uri(Url::parse(url)?);
        Ok(())
    }

    /// `scheme://host[:port]path` of the request.
    pub fn normalized_request_url(&self) -> Option<&str> {
        self.normalized_request_url.as_deref()
    }

    /// `realm` is always carried in the authorization header parameters.
    pub fn realm(&self) -> Option<&str> {
        self.authorization_header_parameters.get(names::REALM)
    }

    pub fn set_realm(&mut self, realm: &str) {
        if realm.is_empty() {
            self.authorization_header_parameters.remove(names::REALM);
        } else {
            self.authorization_header_parameters.set(names::REALM, realm);
        }
    }

    /// Collection new bound parameter values are written to.
    pub fn parameter_location(&self) -> ParameterLocation {
        if self.use_authorization_header {
            ParameterLocation::AuthorizationHeader
        } else if self.request_method.as_deref() == Some("GET") {
            ParameterLocation::Query
        } else {
            ParameterLocation::Form
        }
    }

    /// Read a protocol parameter from the header, query or form collection,
    /// in that order, regardless of the current location.
    pub fn bound_parameter(&self, name: &str) -> Option<&str> {
        self.authorization_header_parameters
            .get(name)
            .or_else(|| self.query_parameters.get(name))
            .or_else(|| self.form_encoded_parameters.get(name))
    }

    /// Write a protocol parameter to the current location.
    ///
    /// An empty value removes the parameter.
    pub fn set_bound_parameter(&mut self, name: &str, value: &str) {
        let collection = self.collection_mut(self.parameter_location());
        if value.is_empty() {
            collection.remove(name);
        } else {
            collection.set(name, value);
        }
    }

    fn collection_mut(&mut self, location: ParameterLocation) -> &mut ParameterCollection {
        match location {
            ParameterLocation::AuthorizationHeader => &mut self.authorization_header_parameters,
            ParameterLocation::Query => &mut self.query_parameters,
            ParameterLocation::Form => &mut self.form_encoded_parameters,
        }
    }

    /// Base64 SHA-1 of the raw content (empty content when unset).
    pub fn generate_body_hash(&self) -> String {
        let digest = Sha1::digest(self.raw_content.as_deref().unwrap_or_default());
        BASE64_STANDARD.encode(digest)
    }

    pub fn generate_and_set_body_hash(&mut self) {
        let hash = self.generate_body_hash();
        self.set_body_hash(&hash);
    }

    /// Build the signature base string (RFC 5849 Section 3.4.1).
    ///
    /// Format: `METHOD&encoded_url&encoded_parameters`. Form parameters
    /// only count for POST; `realm`, `oauth_token_secret` and
    /// `oauth_signature` never do.
    pub fn signature_base(&mut self) -> Result<String, Error> {
        if self.consumer_key().is_none_or(str::is_empty) {
            return Err(OAuthError::missing_required_parameter(names::OAUTH_CONSUMER_KEY).into());
        }
        if self.signature_method().is_none_or(str::is_empty) {
            return Err(
                OAuthError::missing_required_parameter(names::OAUTH_SIGNATURE_METHOD).into(),
            );
        }
        let method = self
            .request_method
            .clone()
            .ok_or(Error::RequestMethodNotAssigned)?;
        let url = self
            .normalized_request_url
            .clone()
            .ok_or(Error::RequestUrlNotAssigned)?;

        if self.include_body_hash_in_signature {
            self.generate_and_set_body_hash();
        }

        let excluded = [names::OAUTH_TOKEN_SECRET];
        let excluded_from_header = [names::OAUTH_TOKEN_SECRET, names::REALM];

        let mut parameters: Vec<(&str, &str)> = Vec::new();
        if method == "POST" {
            parameters.extend(self.form_encoded_parameters.iter_excluding(&excluded));
        }
        parameters.extend(self.query_parameters.iter_excluding(&excluded));
        parameters.extend(self.cookies.iter_excluding(&excluded));
        parameters.extend(
            self.authorization_header_parameters
                .iter_excluding(&excluded_from_header),
        );
        parameters.retain(|(key, _)| *key != names::OAUTH_SIGNATURE);

        Ok(format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            url_encode(&url),
            url_encode(&normalize_request_parameters(parameters))
        ))
    }

    /// `Authorization` header value for the header parameters.
    ///
    /// Format: `OAuth realm="...",key="value",...` with keys and values
    /// percent-encoded. The token secret is never written.
    pub fn authorization_header(&self) -> String {
        format!("OAuth {}", self.oauth_parameters_for_header())
    }

    /// Header parameters as `realm="...",key="value",...`, without the
    /// `OAuth ` scheme prefix.
    pub fn oauth_parameters_for_header(&self) -> String {
        let mut parts = Vec::new();
        if let Some(realm) = self.realm() {
            parts.push(format!("{}=\"{realm}\"", names::REALM));
        }
        for (key, value) in self
            .authorization_header_parameters
            .iter_excluding(&[names::OAUTH_TOKEN_SECRET, names::REALM])
        {
            parts.push(format!("{}=\"{}\"", url_encode(key), url_encode(value)));
        }
        parts.join(",")
    }

    /// Normalized URL plus the query parameters, token secret excluded.
    pub fn generate_uri(&self) -> Result<Url, Error> {
        self.uri_with_query(
            self.query_parameters
                .iter_excluding(&[names::OAUTH_TOKEN_SECRET]),
        )
    }

    /// Normalized URL plus the query parameters that are not `oauth_*` or
    /// `x_auth_*`.
    pub fn generate_uri_without_oauth_parameters(&self) -> Result<Url, Error> {
        self.uri_with_query(
            self.query_parameters
                .iter()
                .filter(|(key, _)| !key.starts_with("oauth_") && !key.starts_with("x_auth_")),
        )
    }

    /// Normalized URL plus every query parameter.
    pub fn generate_url(&self) -> Result<String, Error> {
        let mut url = self.normalized_url()?;
        url.set_query(None);
        Ok(format!(
            "{url}?{}",
            format_query_string(self.query_parameters.iter())
        ))
    }

    fn normalized_url(&self) -> Result<Url, Error> {
        let normalized = self
            .normalized_request_url
            .as_deref()
            .ok_or(Error::RequestUrlNotAssigned)?;
        Ok(Url::parse(normalized)?)
    }

    fn uri_with_query<'a>(
        &self,
        parameters: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Url, Error> {
        let mut url = self.normalized_url()?;
        let query = format_query_string(parameters);
        url.set_query((!query.is_empty()).then_some(query.as_str()));
        Ok(url)
    }
}

impl fmt::Display for OAuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.request_method.as_deref().unwrap_or("?"),
            self.normalized_request_url.as_deref().unwrap_or("?")
        )?;
        let fields = [
            (names::OAUTH_CONSUMER_KEY, self.consumer_key()),
            (names::OAUTH_TOKEN, self.token()),
            (names::OAUTH_SIGNATURE_METHOD, self.signature_method()),
            (names::OAUTH_TIMESTAMP, self.timestamp()),
            (names::OAUTH_NONCE, self.nonce()),
            (names::OAUTH_VERSION, self.version()),
            (names::OAUTH_CALLBACK, self.callback_url()),
            (names::OAUTH_BODY_HASH, self.body_hash()),
            (names::REALM, self.realm()),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                write!(f, " {name}={value}")?;
            }
        }
        Ok(())
    }
}
