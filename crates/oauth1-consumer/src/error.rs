//! Error types for the OAuth consumer.

use oauth1_config::ConfigError;
use oauth1_core::{Error, KeyError, OAuthError, ProblemReport};

/// Error from signing or sending a consumer request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConsumerError {
    /// Signing failure or a problem reported by the provider.
    #[error(transparent)]
    Core(#[from] Error),

    /// The consumer context has no consumer key.
    #[error("the consumer key must be set before signing")]
    EmptyConsumerKey,

    /// RSA-SHA1 is selected but no private key is configured.
    #[error("RSA-SHA1 signing requires a private key")]
    MissingRsaKey,

    /// A request was signed twice.
    #[error("the request has already been signed")]
    AlreadySigned,

    /// The provider did not return `oauth_callback_confirmed=true`.
    #[error("the provider did not confirm the callback")]
    CallbackNotConfirmed,

    /// A session operation needs an endpoint that is not configured.
    #[error("the {0} endpoint is not configured")]
    MissingEndpoint(&'static str),

    /// A token endpoint response could not be used.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The transport cannot send this HTTP method.
    #[error("unsupported HTTP method {0}")]
    UnsupportedMethod(String),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error without an OAuth problem report.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// RSA key loading/parsing error.
    #[error("RSA key error")]
    Key(#[from] KeyError),

    /// Configuration error.
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl ConsumerError {
    /// Problem report when the provider rejected the request.
    pub fn report(&self) -> Option<&ProblemReport> {
        match self {
            Self::Core(error) => error.report(),
            _ => None,
        }
    }
}

impl From<OAuthError> for ConsumerError {
    fn from(error: OAuthError) -> Self {
        Self::Core(Error::OAuth(error))
    }
}

impl From<url::ParseError> for ConsumerError {
    fn from(error: url::ParseError) -> Self {
        Self::Core(Error::InvalidUrl(error))
    }
}
