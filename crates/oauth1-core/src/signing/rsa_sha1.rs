//! RSA-SHA1 signatures (RFC 5849 Section 3.4.3).
//!
//! RSASSA-PKCS1-v1_5 over the SHA-1 digest of the signature base.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use sha1::Sha1;

use crate::context::OAuthContext;
use crate::error::Error;

use super::SigningContext;

pub(super) fn sign(signing_context: &SigningContext) -> Result<String, Error> {
    let private_key = signing_context
        .private_key
        .as_ref()
        .ok_or(Error::MissingRsaKey)?;
    let signing_key = SigningKey::<Sha1>::new(private_key.clone());
    let signature = signing_key.try_sign(signing_context.signature_base.as_bytes())?;
    Ok(BASE64_STANDARD.encode(signature.to_bytes()))
}

/// Verify with the public key, falling back to the private key's public half.
///
/// A signature that is not valid base64 fails validation.
pub(super) fn validate(
    context: &OAuthContext,
    signing_context: &SigningContext,
) -> Result<bool, Error> {
    let public_key = match (&signing_context.public_key, &signing_context.private_key) {
        (Some(public_key), _) => public_key.clone(),
        (None, Some(private_key)) => RsaPublicKey::from(private_key),
        (None, None) => return Err(Error::MissingRsaKey),
    };

    let Some(encoded) = context.signature() else {
        return Ok(false);
    };
    let Ok(bytes) = BASE64_STANDARD.decode(encoded) else {
        return Ok(false);
    };
    let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
        return Ok(false);
    };

    let verifying_key = VerifyingKey::<Sha1>::new(public_key);
    Ok(verifying_key
        .verify(signing_context.signature_base.as_bytes(), &signature)
        .is_ok())
}
