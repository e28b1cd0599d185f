//! Signature methods and the context signer.
//!
//! The three methods defined by OAuth 1.0 are a closed set, so they are an
//! enum rather than trait objects. [`OAuthContextSigner`] keeps an ordered
//! list of the methods it accepts and dispatches on the context's
//! `oauth_signature_method`.

mod hmac_sha1;
mod plaintext;
mod rsa_sha1;

use std::fmt;
use std::str::FromStr;

use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;

use crate::context::OAuthContext;
use crate::error::{Error, OAuthError};

/// An OAuth 1.0 signature method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureMethod {
    #[default]
    PlainText,
    HmacSha1,
    RsaSha1,
}

impl SignatureMethod {
    /// Wire name (`oauth_signature_method` value).
    pub fn name(self) -> &'static str {
        match self {
            Self::PlainText => "PLAINTEXT",
            Self::HmacSha1 => "HMAC-SHA1",
            Self::RsaSha1 => "RSA-SHA1",
        }
    }

    fn sign(self, context: &OAuthContext, signing_context: &SigningContext) -> Result<String, Error> {
        match self {
            Self::PlainText => Ok(plaintext::sign(context, signing_context)),
            Self::HmacSha1 => hmac_sha1::sign(context, signing_context),
            Self::RsaSha1 => rsa_sha1::sign(signing_context),
        }
    }

    fn validate(self, context: &OAuthContext, signing_context: &SigningContext) -> Result<bool, Error> {
        match self {
            Self::PlainText => Ok(plaintext::validate(context, signing_context)),
            Self::HmacSha1 => hmac_sha1::validate(context, signing_context),
            Self::RsaSha1 => rsa_sha1::validate(context, signing_context),
        }
    }
}

impl fmt::Display for SignatureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureMethod {
    type Err = OAuthError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        [Self::PlainText, Self::HmacSha1, Self::RsaSha1]
            .into_iter()
            .find(|method| method.name() == name)
            .ok_or_else(|| OAuthError::unknown_signature_method(name))
    }
}

/// Key material for one sign or validate call.
#[derive(Debug, Clone, Default)]
pub struct SigningContext {
    pub consumer_secret: Option<String>,
    /// Consumer private key (RSA-SHA1 signing).
    pub private_key: Option<RsaPrivateKey>,
    /// Consumer public key (RSA-SHA1 validation).
    pub public_key: Option<RsaPublicKey>,
    /// Filled in by the signer before the method runs.
    pub signature_base: String,
}

impl SigningContext {
    pub fn with_consumer_secret(consumer_secret: Option<&str>) -> Self {
        Self {
            consumer_secret: consumer_secret.map(ToOwned::to_owned),
            ..Self::default()
        }
    }
}

/// Signs and validates contexts with the first matching method.
#[derive(Debug, Clone)]
pub struct OAuthContextSigner {
    methods: Vec<SignatureMethod>,
}

impl Default for OAuthContextSigner {
    fn default() -> Self {
        Self::new(vec![
            SignatureMethod::RsaSha1,
            SignatureMethod::HmacSha1,
            SignatureMethod::PlainText,
        ])
    }
}

impl OAuthContextSigner {
    /// Create a signer accepting only `methods`.
    pub fn new(methods: Vec<SignatureMethod>) -> Self {
        Self { methods }
    }

    pub fn methods(&self) -> &[SignatureMethod] {
        &self.methods
    }

    /// Compute the signature base, sign it and store `oauth_signature`.
    pub fn sign_context(
        &self,
        context: &mut OAuthContext,
        signing_context: &mut SigningContext,
    ) -> Result<(), Error> {
        signing_context.signature_base = context.signature_base()?;
        let method = self.find_method(context)?;
        let signature = method.sign(context, signing_context)?;
        debug!(method = %method, "signed request");
        context.set_signature(&signature);
        Ok(())
    }

    /// Recompute the signature base and check the context's signature.
    pub fn validate_signature(
        &self,
        context: &mut OAuthContext,
        signing_context: &mut SigningContext,
    ) -> Result<bool, Error> {
        signing_context.signature_base = context.signature_base()?;
        let method = self.find_method(context)?;
        method.validate(context, signing_context)
    }

    fn find_method(&self, context: &OAuthContext) -> Result<SignatureMethod, Error> {
        let name = context.signature_method().unwrap_or_default();
        self.methods
            .iter()
            .copied()
            .find(|method| method.name() == name)
            .ok_or_else(|| OAuthError::unknown_signature_method(name).into())
    }
}
