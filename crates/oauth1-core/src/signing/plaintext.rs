//! PLAINTEXT signatures (RFC 5849 Section 3.4.4).

use crate::compare::constant_time_eq;
use crate::context::OAuthContext;
use crate::encoding::url_encode;

use super::SigningContext;

pub(super) fn sign(context: &OAuthContext, signing_context: &SigningContext) -> String {
    format!(
        "{}&{}",
        url_encode(signing_context.consumer_secret.as_deref().unwrap_or_default()),
        url_encode(context.token_secret().unwrap_or_default())
    )
}

/// Fails without a consumer secret; an absent secret never matches `&`.
pub(super) fn validate(context: &OAuthContext, signing_context: &SigningContext) -> bool {
    if signing_context.consumer_secret.is_none() {
        return false;
    }
    let expected = sign(context, signing_context);
    constant_time_eq(context.signature(), Some(&expected))
}
