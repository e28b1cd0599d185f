//! In-memory reference stores.
//!
//! Suitable for tests and single-process providers. Nothing is persisted and
//! issued tokens are never evicted.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{TimeDelta, Utc};
use oauth1_config::ProviderConfig;
use oauth1_core::parameters::names;
use oauth1_core::{
    AccessToken, Error, OAuthContext, OAuthError, RequestToken, RsaPublicKey, Token,
};
use tracing::debug;
use uuid::Uuid;

use crate::store::{ConsumerStore, NonceStore, RequestForAccessStatus, TokenStore};

/// Default access token lifetime.
const DEFAULT_ACCESS_TOKEN_LIFETIME_DAYS: i64 = 20;

/// [`TokenStore`] keeping request and access tokens in hash maps.
///
/// Request tokens move through approval with
/// [`approve_request_token`](Self::approve_request_token) or
/// [`deny_request_token`](Self::deny_request_token), which the provider's
/// authorization page calls on the user's behalf.
#[derive(Debug)]
pub struct InMemoryTokenStore {
    request_tokens: RwLock<HashMap<String, RequestToken>>,
    access_tokens: RwLock<HashMap<String, AccessToken>>,
    access_token_lifetime: TimeDelta,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self {
            request_tokens: RwLock::new(HashMap::new()),
            access_tokens: RwLock::new(HashMap::new()),
            access_token_lifetime: TimeDelta::days(DEFAULT_ACCESS_TOKEN_LIFETIME_DAYS),
        }
    }
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new().with_access_token_lifetime(TimeDelta::days(i64::from(
            config.access_token_lifetime_days,
        )))
    }

    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: TimeDelta) -> Self {
        self.access_token_lifetime = lifetime;
        self
    }

    /// Record the user's approval of a request token.
    ///
    /// Issues the access token the consumer receives on exchange and returns
    /// the verifier to hand back through the callback.
    pub fn approve_request_token(&self, token: &str, user_name: &str) -> Result<String, Error> {
        let mut request_tokens = self
            .request_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let request_token = request_tokens
            .get_mut(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;

        let access_token = self.issue_access_token(&request_token.token, Some(user_name));
        let verifier = Uuid::new_v4().simple().to_string();
        request_token.verifier = Some(verifier.clone());
        request_token.access_denied = false;
        request_token.access_token = Some(access_token.clone());

        self.access_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(access_token.token.token.clone(), access_token);
        debug!(token, user_name, "request token approved");
        Ok(verifier)
    }

    /// Record the user's refusal of a request token.
    pub fn deny_request_token(&self, token: &str) -> Result<(), Error> {
        let mut request_tokens = self
            .request_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let request_token = request_tokens
            .get_mut(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;
        request_token.access_denied = true;
        request_token.access_token = None;
        debug!(token, "request token denied");
        Ok(())
    }

    pub fn request_token(&self, token: &str) -> Option<RequestToken> {
        self.request_tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    pub fn access_token(&self, token: &str) -> Option<AccessToken> {
        self.access_tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .cloned()
    }

    fn issue_access_token(&self, owner: &Token, user_name: Option<&str>) -> AccessToken {
        AccessToken {
            token: Token {
                consumer_key: owner.consumer_key.clone(),
                realm: owner.realm.clone(),
                token: Uuid::new_v4().to_string(),
                token_secret: Uuid::new_v4().to_string(),
                session_handle: Some(Uuid::new_v4().to_string()),
            },
            expiry_date: Utc::now().checked_add_signed(self.access_token_lifetime),
            user_name: user_name.map(ToOwned::to_owned),
            roles: Vec::new(),
        }
    }

    fn with_request_token<T>(
        &self,
        context: &OAuthContext,
        f: impl FnOnce(&RequestToken) -> T,
    ) -> Result<T, Error> {
        let token = context_token(context)?;
        let request_tokens = self
            .request_tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let request_token = request_tokens
            .get(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;
        Ok(f(request_token))
    }

    fn with_access_token<T>(
        &self,
        context: &OAuthContext,
        f: impl FnOnce(&AccessToken) -> T,
    ) -> Result<T, Error> {
        let token = context_token(context)?;
        let access_tokens = self
            .access_tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let access_token = access_tokens
            .get(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;
        Ok(f(access_token))
    }
}

impl TokenStore for InMemoryTokenStore {
    fn create_request_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        let token = Token {
            consumer_key: context.consumer_key().unwrap_or_default().to_owned(),
            realm: context.realm().map(ToOwned::to_owned),
            token: Uuid::new_v4().to_string(),
            token_secret: Uuid::new_v4().to_string(),
            session_handle: None,
        };
        let request_token = RequestToken {
            token: token.clone(),
            callback_url: context.callback_url().map(ToOwned::to_owned),
            ..RequestToken::default()
        };

        self.request_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.token.clone(), request_token);
        Ok(token)
    }

    fn consume_request_token(&self, context: &OAuthContext) -> Result<(), Error> {
        let token = context_token(context)?;
        let mut request_tokens = self
            .request_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let request_token = request_tokens
            .get_mut(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;

        if request_token.used_up {
            return Err(OAuthError::token_already_consumed().into());
        }
        request_token.used_up = true;
        Ok(())
    }

    fn consume_access_token(&self, context: &OAuthContext) -> Result<(), Error> {
        let expired = self.with_access_token(context, |token| token.is_expired(Utc::now()))?;
        if expired {
            return Err(OAuthError::token_expired().into());
        }
        Ok(())
    }

    fn access_token_for_request_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        self.with_request_token(context, |request_token| {
            request_token
                .access_token
                .as_ref()
                .map(|access_token| access_token.token.clone())
        })?
        .ok_or_else(|| OAuthError::access_not_yet_granted().into())
    }

    fn status_of_request_for_access(
        &self,
        context: &OAuthContext,
    ) -> Result<RequestForAccessStatus, Error> {
        self.with_request_token(context, |request_token| {
            if request_token.access_denied {
                RequestForAccessStatus::Denied
            } else if request_token.access_token.is_none() {
                RequestForAccessStatus::Unknown
            } else {
                RequestForAccessStatus::Granted
            }
        })
    }

    fn callback_url_for_token(&self, context: &OAuthContext) -> Result<Option<String>, Error> {
        self.with_request_token(context, |request_token| request_token.callback_url.clone())
    }

    fn verification_code_for_request_token(
        &self,
        context: &OAuthContext,
    ) -> Result<Option<String>, Error> {
        self.with_request_token(context, |request_token| request_token.verifier.clone())
    }

    fn request_token_secret(&self, context: &OAuthContext) -> Result<String, Error> {
        self.with_request_token(context, |request_token| {
            request_token.token.token_secret.clone()
        })
    }

    fn access_token_secret(&self, context: &OAuthContext) -> Result<String, Error> {
        self.with_access_token(context, |access_token| {
            access_token.token.token_secret.clone()
        })
    }

    fn create_access_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        let owner = Token {
            consumer_key: context.consumer_key().unwrap_or_default().to_owned(),
            realm: context.realm().map(ToOwned::to_owned),
            ..Token::default()
        };
        let access_token = self.issue_access_token(&owner, context.x_auth_username());
        let token = access_token.token.clone();

        self.access_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.token.clone(), access_token);
        Ok(token)
    }

    fn renew_access_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        let token = context_token(context)?;
        let session_handle = context
            .session_handle()
            .filter(|handle| !handle.is_empty())
            .ok_or_else(|| OAuthError::missing_required_parameter(names::OAUTH_SESSION_HANDLE))?;

        let mut access_tokens = self
            .access_tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let current = access_tokens
            .get(token)
            .ok_or_else(|| OAuthError::unknown_token(token))?;
        if current.token.session_handle.as_deref() != Some(session_handle) {
            return Err(OAuthError::rejected_parameter(names::OAUTH_SESSION_HANDLE).into());
        }

        let mut renewed = self.issue_access_token(&current.token, current.user_name.as_deref());
        renewed.token.session_handle.clone_from(&current.token.session_handle);
        renewed.roles.clone_from(&current.roles);
        let token_value = renewed.token.clone();

        access_tokens.remove(token);
        access_tokens.insert(token_value.token.clone(), renewed);
        debug!(consumer_key = %token_value.consumer_key, "access token renewed");
        Ok(token_value)
    }
}

fn context_token(context: &OAuthContext) -> Result<&str, OAuthError> {
    context
        .token()
        .filter(|token| !token.is_empty())
        .ok_or_else(|| OAuthError::missing_required_parameter(names::OAUTH_TOKEN))
}

/// [`NonceStore`] keeping every nonce per consumer key.
#[derive(Debug, Default)]
pub struct InMemoryNonceStore {
    nonces: RwLock<HashMap<String, Arc<Mutex<HashSet<String>>>>>,
}

impl InMemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn nonces_for_consumer(&self, consumer_key: &str) -> Arc<Mutex<HashSet<String>>> {
        if let Some(nonces) = self
            .nonces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(consumer_key)
        {
            return Arc::clone(nonces);
        }

        // Another thread may have created the set between the two locks.
        let mut all = self.nonces.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(all.entry(consumer_key.to_owned()).or_default())
    }
}

impl NonceStore for InMemoryNonceStore {
    fn record_nonce_and_check_is_unique(
        &self,
        context: &OAuthContext,
        nonce: &str,
    ) -> Result<bool, Error> {
        let nonces = self.nonces_for_consumer(context.consumer_key().unwrap_or_default());
        let mut nonces = nonces.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(nonces.insert(nonce.to_owned()))
    }
}

/// A consumer registered with [`InMemoryConsumerStore`].
#[derive(Debug, Clone, Default)]
pub struct RegisteredConsumer {
    pub consumer_key: String,
    pub realm: Option<String>,
    pub consumer_secret: Option<String>,
    pub public_key: Option<RsaPublicKey>,
}

impl RegisteredConsumer {
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_secret(mut self, consumer_secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(consumer_secret.into());
        self
    }

    #[must_use]
    pub fn with_public_key(mut self, public_key: RsaPublicKey) -> Self {
        self.public_key = Some(public_key);
        self
    }

    #[must_use]
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }
}

/// [`ConsumerStore`] over a fixed set of registered consumers.
#[derive(Debug, Default)]
pub struct InMemoryConsumerStore {
    consumers: RwLock<HashMap<String, RegisteredConsumer>>,
}

impl InMemoryConsumerStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_consumer(self, consumer: RegisteredConsumer) -> Self {
        self.register(consumer);
        self
    }

    /// Add or replace a consumer.
    pub fn register(&self, consumer: RegisteredConsumer) {
        self.consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(consumer.consumer_key.clone(), consumer);
    }

    fn lookup<T>(
        &self,
        context: &OAuthContext,
        f: impl FnOnce(&RegisteredConsumer) -> Option<T>,
    ) -> Option<T> {
        let consumers = self.consumers.read().unwrap_or_else(PoisonError::into_inner);
        consumers
            .get(context.consumer_key().unwrap_or_default())
            .and_then(f)
    }
}

impl ConsumerStore for InMemoryConsumerStore {
    fn is_consumer(&self, context: &OAuthContext) -> Result<bool, Error> {
        Ok(self
            .lookup(context, |consumer| {
                Some(consumer.realm.as_deref() == context.realm())
            })
            .unwrap_or(false))
    }

    fn consumer_secret(&self, context: &OAuthContext) -> Result<Option<String>, Error> {
        Ok(self.lookup(context, |consumer| consumer.consumer_secret.clone()))
    }

    fn consumer_public_key(&self, context: &OAuthContext) -> Result<Option<RsaPublicKey>, Error> {
        Ok(self.lookup(context, |consumer| consumer.public_key.clone()))
    }
}
