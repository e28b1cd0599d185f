//! HMAC-SHA1 signatures (RFC 5849 Section 3.4.2).

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::compare::constant_time_eq;
use crate::context::OAuthContext;
use crate::encoding::url_encode;
use crate::error::Error;

use super::SigningContext;

type HmacSha1 = Hmac<Sha1>;

pub(super) fn sign(context: &OAuthContext, signing_context: &SigningContext) -> Result<String, Error> {
    let key = format!(
        "{}&{}",
        url_encode(signing_context.consumer_secret.as_deref().unwrap_or_default()),
        url_encode(context.token_secret().unwrap_or_default())
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())?;
    mac.update(signing_context.signature_base.as_bytes());
    Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
}

pub(super) fn validate(
    context: &OAuthContext,
    signing_context: &SigningContext,
) -> Result<bool, Error> {
    if signing_context.consumer_secret.is_none() {
        return Ok(false);
    }
    let expected = sign(context, signing_context)?;
    Ok(constant_time_eq(context.signature(), Some(&expected)))
}
