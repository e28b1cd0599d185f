use oauth1_core::{Error, OAuthContext, OAuthError, SignatureMethod, constant_time_eq};

use super::ContextInspector;
use crate::store::ProviderPhase;

/// Checks `oauth_body_hash` against the raw request body.
///
/// Requests without a body hash pass. PLAINTEXT requests are not checked.
/// A body hash on a form-encoded request is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyHashValidationInspector;

impl ContextInspector for BodyHashValidationInspector {
    fn inspect_context(
        &self,
        _phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        if context.signature_method() == Some(SignatureMethod::PlainText.name()) {
            return Ok(());
        }
        let Some(body_hash) = context.body_hash() else {
            return Ok(());
        };

        if !context.form_encoded_parameters.is_empty() {
            return Err(OAuthError::unexpected_body_hash_in_form_request().into());
        }
        if !constant_time_eq(Some(body_hash), Some(&context.generate_body_hash())) {
            return Err(OAuthError::failed_to_validate_body_hash().into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EMPTY_BODY_HASH: &str = "2jmj7l5rSw0yVb/vlWAYkK/YBwk=";

    fn context(use_header: bool, body_hash: &str, method: SignatureMethod) -> OAuthContext {
        let mut context = OAuthContext::new();
        context.use_authorization_header = use_header;
        context.set_body_hash(body_hash);
        context.set_signature_method(method.name());
        context
    }

    fn inspect(context: &mut OAuthContext) -> Result<(), Error> {
        BodyHashValidationInspector
            .inspect_context(ProviderPhase::AccessProtectedResourceRequest, context)
    }

    #[test]
    fn test_absent_hash_passes() {
        assert!(inspect(&mut context(true, "", SignatureMethod::HmacSha1)).is_ok());
    }

    #[test]
    fn test_matching_hash_passes() {
        assert!(inspect(&mut context(true, EMPTY_BODY_HASH, SignatureMethod::HmacSha1)).is_ok());
    }

    #[test]
    fn test_matching_hash_of_body_passes() {
        let mut context = context(true, "", SignatureMethod::RsaSha1);
        context.raw_content = Some(b"Hello World!".to_vec());
        context.generate_and_set_body_hash();

        assert!(inspect(&mut context).is_ok());
    }

    #[test]
    fn test_mismatched_hash_rejected() {
        let err = inspect(&mut context(true, "wrong", SignatureMethod::HmacSha1)).unwrap_err();

        assert_eq!(err.to_string(), "Failed to validate body hash");
    }

    #[test]
    fn test_plaintext_not_checked() {
        assert!(inspect(&mut context(true, "wrong", SignatureMethod::PlainText)).is_ok());
    }

    #[test]
    fn test_hash_in_form_request_rejected() {
        let err = inspect(&mut context(false, "1234", SignatureMethod::HmacSha1)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Encountered unexpected oauth_body_hash value in form-encoded request"
        );
    }
}
