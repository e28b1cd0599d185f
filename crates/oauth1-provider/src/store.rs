//! Collaborator contracts the provider depends on.
//!
//! Stores take `&self` and are shared behind `Arc`, so implementations own
//! their synchronization. Every method receives the inbound context; the
//! token it refers to is `context.token()`.

use oauth1_core::{Error, OAuthContext, RsaPublicKey, Token};

/// Step of the protocol a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderPhase {
    GrantRequestToken,
    ExchangeRequestTokenForAccessToken,
    /// xAuth: access token straight from user credentials.
    CreateAccessToken,
    AccessProtectedResourceRequest,
    RenewAccessToken,
}

/// Whether the user has acted on a request token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestForAccessStatus {
    /// Not yet approved or denied.
    Unknown,
    Granted,
    Denied,
}

/// Issues, tracks and consumes request and access tokens.
pub trait TokenStore: Send + Sync {
    /// Issue a request token bound to the consumer and its callback.
    fn create_request_token(&self, context: &OAuthContext) -> Result<Token, Error>;

    /// Mark the request token used. A second call for the same token fails.
    fn consume_request_token(&self, context: &OAuthContext) -> Result<(), Error>;

    /// Check the access token is known and unexpired.
    fn consume_access_token(&self, context: &OAuthContext) -> Result<(), Error>;

    /// Access token the user bound to the request token on approval.
    fn access_token_for_request_token(&self, context: &OAuthContext) -> Result<Token, Error>;

    fn status_of_request_for_access(
        &self,
        context: &OAuthContext,
    ) -> Result<RequestForAccessStatus, Error>;

    fn callback_url_for_token(&self, context: &OAuthContext) -> Result<Option<String>, Error>;

    /// Verifier issued when the user approved the request token.
    fn verification_code_for_request_token(
        &self,
        context: &OAuthContext,
    ) -> Result<Option<String>, Error>;

    fn request_token_secret(&self, context: &OAuthContext) -> Result<String, Error>;

    fn access_token_secret(&self, context: &OAuthContext) -> Result<String, Error>;

    /// Issue an access token directly (xAuth).
    fn create_access_token(&self, context: &OAuthContext) -> Result<Token, Error>;

    /// Replace the access token using its session handle.
    fn renew_access_token(&self, context: &OAuthContext) -> Result<Token, Error>;
}

/// Remembers nonces per consumer.
pub trait NonceStore: Send + Sync {
    /// Record `nonce` for the context's consumer and report whether it was
    /// unseen.
    ///
    /// The check and the insert must be one atomic step: two concurrent
    /// calls with the same nonce must not both return `true`.
    fn record_nonce_and_check_is_unique(
        &self,
        context: &OAuthContext,
        nonce: &str,
    ) -> Result<bool, Error>;
}

/// Registered consumers and their key material.
pub trait ConsumerStore: Send + Sync {
    /// Whether the consumer key and realm belong to a registered consumer.
    fn is_consumer(&self, context: &OAuthContext) -> Result<bool, Error>;

    /// Shared secret for PLAINTEXT and HMAC-SHA1.
    fn consumer_secret(&self, context: &OAuthContext) -> Result<Option<String>, Error>;

    /// Public key for RSA-SHA1.
    fn consumer_public_key(&self, context: &OAuthContext) -> Result<Option<RsaPublicKey>, Error>;
}
