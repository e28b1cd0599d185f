//! Consumer credentials and request signing.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use oauth1_config::ConsumerConfig;
use oauth1_core::key::load_private_key_from_file;
use oauth1_core::{
    OAUTH_VERSION, OAuthContext, OAuthContextSigner, RsaPrivateKey, SignatureMethod,
    SigningContext, Token,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::ConsumerError;

/// Source of `oauth_nonce` values.
pub trait NonceGenerator: Send + Sync {
    fn generate_nonce(&self, context: &OAuthContext) -> String;
}

/// Random UUID v4 nonces.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidNonceGenerator;

impl NonceGenerator for GuidNonceGenerator {
    fn generate_nonce(&self, _context: &OAuthContext) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Credentials and signing preferences of one consumer.
#[derive(Clone)]
pub struct OAuthConsumerContext {
    pub consumer_key: String,
    /// Used by PLAINTEXT and HMAC-SHA1.
    pub consumer_secret: Option<String>,
    /// Used by RSA-SHA1.
    pub key: Option<RsaPrivateKey>,
    pub realm: Option<String>,
    pub signature_method: SignatureMethod,
    /// Send protocol parameters in the `Authorization` header instead of the
    /// query string or form body.
    pub use_header_for_oauth_parameters: bool,
    pub user_agent: Option<String>,
    nonce_generator: Arc<dyn NonceGenerator>,
    signer: OAuthContextSigner,
}

impl Default for OAuthConsumerContext {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: None,
            key: None,
            realm: None,
            signature_method: SignatureMethod::PlainText,
            use_header_for_oauth_parameters: false,
            user_agent: None,
            nonce_generator: Arc::new(GuidNonceGenerator),
            signer: OAuthContextSigner::default(),
        }
    }
}

impl fmt::Debug for OAuthConsumerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConsumerContext")
            .field("consumer_key", &self.consumer_key)
            .field("realm", &self.realm)
            .field("signature_method", &self.signature_method)
            .field(
                "use_header_for_oauth_parameters",
                &self.use_header_for_oauth_parameters,
            )
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl OAuthConsumerContext {
    #[must_use]
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_consumer_secret(mut self, consumer_secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(consumer_secret.into());
        self
    }

    #[must_use]
    pub fn with_private_key(mut self, key: RsaPrivateKey) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    #[must_use]
    pub fn with_signature_method(mut self, signature_method: SignatureMethod) -> Self {
        self.signature_method = signature_method;
        self
    }

    #[must_use]
    pub fn with_header_for_oauth_parameters(mut self, enabled: bool) -> Self {
        self.use_header_for_oauth_parameters = enabled;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the nonce source.
    #[must_use]
    pub fn with_nonce_generator(mut self, generator: impl NonceGenerator + 'static) -> Self {
        self.nonce_generator = Arc::new(generator);
        self
    }

    /// Build a consumer context from the `[consumer]` config section.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature method is unknown or the private
    /// key file cannot be loaded.
    pub fn from_config(config: &ConsumerConfig) -> Result<Self, ConsumerError> {
        let signature_method: SignatureMethod = config.signature_method.parse()?;
        let key = config
            .private_key_file
            .as_deref()
            .map(load_private_key_from_file)
            .transpose()?;

        Ok(Self {
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            key,
            realm: config.realm.clone(),
            signature_method,
            use_header_for_oauth_parameters: config.use_authorization_header,
            ..Self::default()
        })
    }

    /// Fill in the consumer's protocol parameters and sign `context`.
    ///
    /// Sets the parameter location, nonce, consumer key, realm, signature
    /// method, timestamp and version, then writes `oauth_signature`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::EmptyConsumerKey`] or
    /// [`ConsumerError::MissingRsaKey`] before touching the context, or the
    /// signing error.
    pub fn sign_context(&self, context: &mut OAuthContext) -> Result<(), ConsumerError> {
        if self.consumer_key.is_empty() {
            return Err(ConsumerError::EmptyConsumerKey);
        }
        if self.signature_method == SignatureMethod::RsaSha1 && self.key.is_none() {
            return Err(ConsumerError::MissingRsaKey);
        }

        context.use_authorization_header = self.use_header_for_oauth_parameters;
        let nonce = self.nonce_generator.generate_nonce(context);
        context.set_nonce(&nonce);
        context.set_consumer_key(&self.consumer_key);
        if let Some(realm) = &self.realm {
            context.set_realm(realm);
        }
        context.set_signature_method(self.signature_method.name());
        context.set_timestamp(&Utc::now().timestamp().to_string());
        context.set_version(OAUTH_VERSION);

        let mut signing_context =
            SigningContext::with_consumer_secret(self.consumer_secret.as_deref());
        signing_context.private_key.clone_from(&self.key);
        self.signer.sign_context(context, &mut signing_context)?;

        debug!(
            method = context.request_method().unwrap_or_default(),
            url = context.normalized_request_url().unwrap_or_default(),
            signature_method = %self.signature_method,
            "signed request"
        );
        Ok(())
    }

    /// Sign `context` on behalf of `token`.
    ///
    /// # Errors
    ///
    /// See [`sign_context`](Self::sign_context).
    pub fn sign_context_with_token(
        &self,
        context: &mut OAuthContext,
        token: &Token,
    ) -> Result<(), ConsumerError> {
        context.set_token(&token.token);
        context.set_token_secret(&token.token_secret);
        self.sign_context(context)
    }
}
