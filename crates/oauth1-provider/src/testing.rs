//! Fixture stores with fixed tokens and credentials.
//!
//! Only the consumer `key` (with no realm) is known. Every token request
//! gets `requestkey`/`requestsecret`, every access token is
//! `accesskey`/`accesssecret`.

use oauth1_core::testing::test_public_key;
use oauth1_core::{Error, OAuthContext, OAuthError, Problem, RsaPublicKey, Token};

use crate::store::{ConsumerStore, RequestForAccessStatus, TokenStore};

pub const CONSUMER_KEY: &str = "key";
pub const CONSUMER_SECRET: &str = "secret";
pub const REQUEST_TOKEN: &str = "requestkey";
pub const REQUEST_SECRET: &str = "requestsecret";
pub const ACCESS_TOKEN: &str = "accesskey";
pub const ACCESS_SECRET: &str = "accesssecret";
pub const SESSION_HANDLE: &str = "sessionHandle";
pub const CALLBACK_URL: &str = "http://localhost/callback";
pub const VERIFICATION_CODE: &str = "GzvVb5WjWfHKa/0JuFupaMyn";

/// Knows consumer `key`; hands out the shared secret to anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestConsumerStore;

impl ConsumerStore for TestConsumerStore {
    fn is_consumer(&self, context: &OAuthContext) -> Result<bool, Error> {
        Ok(context.consumer_key() == Some(CONSUMER_KEY) && context.realm().is_none())
    }

    fn consumer_secret(&self, _context: &OAuthContext) -> Result<Option<String>, Error> {
        Ok(Some(CONSUMER_SECRET.to_owned()))
    }

    fn consumer_public_key(&self, _context: &OAuthContext) -> Result<Option<RsaPublicKey>, Error> {
        Ok(Some(test_public_key()))
    }
}

/// Token store answering with the fixed fixture tokens.
#[derive(Debug, Clone)]
pub struct TestTokenStore {
    pub callback_url: String,
    pub verification_code: String,
}

impl Default for TestTokenStore {
    fn default() -> Self {
        Self {
            callback_url: CALLBACK_URL.to_owned(),
            verification_code: VERIFICATION_CODE.to_owned(),
        }
    }
}

impl TestTokenStore {
    fn access_token(session_handle: Option<&str>) -> Token {
        Token {
            session_handle: session_handle.map(ToOwned::to_owned),
            ..Token::new(CONSUMER_KEY, ACCESS_TOKEN, ACCESS_SECRET)
        }
    }
}

fn ensure_test_consumer(context: &OAuthContext) -> Result<(), Error> {
    if context.realm().is_some() {
        return Err(OAuthError::new(
            Problem::ConsumerKeyRejected,
            "supplied realm was unknown to the provider",
        )
        .into());
    }
    if context.consumer_key() != Some(CONSUMER_KEY) {
        return Err(OAuthError::new(
            Problem::ConsumerKeyRejected,
            "supplied consumer key was unknown to the provider",
        )
        .into());
    }
    Ok(())
}

fn ensure_token(context: &OAuthContext, expected: &str, kind: &str) -> Result<(), Error> {
    if context.token() == Some(expected) {
        return Ok(());
    }
    Err(OAuthError::new(
        Problem::TokenRejected,
        format!("The supplied {kind} token is unknown to the provider."),
    )
    .into())
}

impl TokenStore for TestTokenStore {
    fn create_request_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        ensure_test_consumer(context)?;
        Ok(Token::new(CONSUMER_KEY, REQUEST_TOKEN, REQUEST_SECRET))
    }

    fn consume_request_token(&self, context: &OAuthContext) -> Result<(), Error> {
        ensure_test_consumer(context)?;
        ensure_token(context, REQUEST_TOKEN, "request")
    }

    fn consume_access_token(&self, context: &OAuthContext) -> Result<(), Error> {
        ensure_test_consumer(context)?;
        ensure_token(context, ACCESS_TOKEN, "access")
    }

    fn access_token_for_request_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        ensure_test_consumer(context)?;
        ensure_token(context, REQUEST_TOKEN, "request")?;
        Ok(Self::access_token(None))
    }

    fn status_of_request_for_access(
        &self,
        context: &OAuthContext,
    ) -> Result<RequestForAccessStatus, Error> {
        if context.consumer_key() == Some(CONSUMER_KEY) && context.token() == Some(REQUEST_TOKEN) {
            Ok(RequestForAccessStatus::Granted)
        } else {
            Ok(RequestForAccessStatus::Unknown)
        }
    }

    fn callback_url_for_token(&self, _context: &OAuthContext) -> Result<Option<String>, Error> {
        Ok(Some(self.callback_url.clone()))
    }

    fn verification_code_for_request_token(
        &self,
        _context: &OAuthContext,
    ) -> Result<Option<String>, Error> {
        Ok(Some(self.verification_code.clone()))
    }

    fn request_token_secret(&self, _context: &OAuthContext) -> Result<String, Error> {
        Ok(REQUEST_SECRET.to_owned())
    }

    fn access_token_secret(&self, _context: &OAuthContext) -> Result<String, Error> {
        Ok(ACCESS_SECRET.to_owned())
    }

    fn create_access_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        ensure_test_consumer(context)?;
        Ok(Self::access_token(Some(SESSION_HANDLE)))
    }

    fn renew_access_token(&self, context: &OAuthContext) -> Result<Token, Error> {
        ensure_test_consumer(context)?;
        Ok(Self::access_token(context.session_handle()))
    }
}
