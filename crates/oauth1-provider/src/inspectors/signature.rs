use std::sync::Arc;

use oauth1_core::{
    Error, OAuthContext, OAuthContextSigner, OAuthError, SignatureMethod, SigningContext,
};

use super::ContextInspector;
use crate::store::{ConsumerStore, ProviderPhase};

/// Recomputes the signature with the consumer's key material.
///
/// RSA-SHA1 needs the consumer's public key, every other method its shared
/// secret. A consumer without the material for the requested method is
/// rejected with `signature_method_rejected`.
pub struct SignatureValidationInspector {
    consumer_store: Arc<dyn ConsumerStore>,
    signer: OAuthContextSigner,
}

impl SignatureValidationInspector {
    pub fn new(consumer_store: Arc<dyn ConsumerStore>) -> Self {
        Self::with_signer(consumer_store, OAuthContextSigner::default())
    }

    /// Accept only the methods `signer` knows.
    pub fn with_signer(consumer_store: Arc<dyn ConsumerStore>, signer: OAuthContextSigner) -> Self {
        Self {
            consumer_store,
            signer,
        }
    }

    fn signing_context(&self, context: &OAuthContext) -> Result<SigningContext, Error> {
        let method = context.signature_method().unwrap_or_default();
        let unavailable = || Error::from(OAuthError::signature_method_unavailable(method));

        if method == SignatureMethod::RsaSha1.name() {
            let public_key = self
                .consumer_store
                .consumer_public_key(context)?
                .ok_or_else(unavailable)?;
            return Ok(SigningContext {
                public_key: Some(public_key),
                ..SigningContext::default()
            });
        }

        let consumer_secret = self
            .consumer_store
            .consumer_secret(context)?
            .ok_or_else(unavailable)?;
        Ok(SigningContext::with_consumer_secret(Some(&consumer_secret)))
    }
}

impl ContextInspector for SignatureValidationInspector {
    fn inspect_context(
        &self,
        _phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        let mut signing_context = self.signing_context(context)?;
        if self
            .signer
            .validate_signature(context, &mut signing_context)?
        {
            Ok(())
        } else {
            Err(OAuthError::failed_to_validate_signature().into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryConsumerStore, RegisteredConsumer};
    use crate::testing::TestConsumerStore;
    use oauth1_core::Problem;
    use oauth1_core::testing::{test_private_key, test_public_key};
    use pretty_assertions::assert_eq;

    fn signed_context(method: SignatureMethod) -> OAuthContext {
        let mut context = OAuthContext::for_request("GET", "http://localhost/resource").unwrap();
        context.set_consumer_key("key");
        context.set_nonce("nonce");
        context.set_timestamp("1199188800");
        context.set_signature_method(method.name());

        let mut signing = SigningContext::with_consumer_secret(Some("secret"));
        signing.private_key = Some(test_private_key());
        OAuthContextSigner::default()
            .sign_context(&mut context, &mut signing)
            .unwrap();
        context
    }

    fn inspector() -> SignatureValidationInspector {
        SignatureValidationInspector::new(Arc::new(TestConsumerStore))
    }

    #[test]
    fn test_valid_signatures_pass() {
        for method in [
            SignatureMethod::PlainText,
            SignatureMethod::HmacSha1,
            SignatureMethod::RsaSha1,
        ] {
            let mut context = signed_context(method);

            let result =
                inspector().inspect_context(ProviderPhase::GrantRequestToken, &mut context);

            assert!(result.is_ok(), "{method} should validate");
        }
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let mut context = signed_context(SignatureMethod::HmacSha1);
        context.set_signature("wrong");

        let err = inspector()
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to validate signature");
    }

    #[test]
    fn test_tampered_parameters_rejected() {
        let mut context = signed_context(SignatureMethod::RsaSha1);
        context.set_nonce("replaced");

        let err = inspector()
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to validate signature");
    }

    #[test]
    fn test_restricted_signer_rejects_other_methods() {
        let inspector = SignatureValidationInspector::with_signer(
            Arc::new(TestConsumerStore),
            OAuthContextSigner::new(vec![SignatureMethod::HmacSha1]),
        );
        let mut context = signed_context(SignatureMethod::PlainText);

        let err = inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(err.to_string(), "Unknown signature method \"PLAINTEXT\"");
    }

    fn rsa_only_inspector() -> SignatureValidationInspector {
        let consumers = InMemoryConsumerStore::new()
            .with_consumer(RegisteredConsumer::new("key").with_public_key(test_public_key()));
        SignatureValidationInspector::new(Arc::new(consumers))
    }

    #[test]
    fn test_forged_plaintext_for_rsa_only_consumer_rejected() {
        let mut context = OAuthContext::for_request("GET", "http://localhost/resource").unwrap();
        context.set_consumer_key("key");
        context.set_nonce("nonce");
        context.set_timestamp("1199188800");
        context.set_signature_method("PLAINTEXT");
        context.set_signature("&");

        let err = rsa_only_inspector()
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(
            err.report().unwrap().problem,
            Some(Problem::SignatureMethodRejected)
        );
    }

    #[test]
    fn test_hmac_with_empty_key_for_rsa_only_consumer_rejected() {
        let mut context = OAuthContext::for_request("GET", "http://localhost/resource").unwrap();
        context.set_consumer_key("key");
        context.set_nonce("nonce");
        context.set_timestamp("1199188800");
        context.set_signature_method("HMAC-SHA1");
        OAuthContextSigner::default()
            .sign_context(&mut context, &mut SigningContext::with_consumer_secret(Some("")))
            .unwrap();

        let err = rsa_only_inspector()
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Signature method \"HMAC-SHA1\" is not available for this consumer"
        );
    }

    #[test]
    fn test_rsa_only_consumer_still_validates_rsa() {
        let mut context = signed_context(SignatureMethod::RsaSha1);

        let result =
            rsa_only_inspector().inspect_context(ProviderPhase::GrantRequestToken, &mut context);

        assert!(result.is_ok());
    }

    #[test]
    fn test_rsa_without_public_key_is_protocol_error() {
        let inspector = SignatureValidationInspector::new(Arc::new(InMemoryConsumerStore::new()));
        let mut context = signed_context(SignatureMethod::RsaSha1);

        let err = inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(
            err.report().unwrap().problem,
            Some(Problem::SignatureMethodRejected)
        );
        assert_eq!(
            err.to_string(),
            "Signature method \"RSA-SHA1\" is not available for this consumer"
        );
    }

    #[test]
    fn test_inspector_name() {
        assert_eq!(inspector().name(), "SignatureValidationInspector");
    }
}
