use std::sync::Arc;

use oauth1_core::parameters::names;
use oauth1_core::{Error, OAuthContext, OAuthError};

use super::ContextInspector;
use crate::store::{NonceStore, ProviderPhase};

/// Rejects a nonce the consumer has used before.
pub struct NonceStoreInspector {
    nonce_store: Arc<dyn NonceStore>,
}

impl NonceStoreInspector {
    pub fn new(nonce_store: Arc<dyn NonceStore>) -> Self {
        Self { nonce_store }
    }
}

impl ContextInspector for NonceStoreInspector {
    fn inspect_context(
        &self,
        _phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        let nonce = context
            .nonce()
            .ok_or_else(|| OAuthError::missing_required_parameter(names::OAUTH_NONCE))?;

        if self
            .nonce_store
            .record_nonce_and_check_is_unique(context, nonce)?
        {
            Ok(())
        } else {
            Err(OAuthError::nonce_has_already_been_used(nonce).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryNonceStore;
    use oauth1_core::Problem;
    use pretty_assertions::assert_eq;

    fn context(consumer_key: &str, nonce: &str) -> OAuthContext {
        let mut context = OAuthContext::new();
        context.set_consumer_key(consumer_key);
        context.set_nonce(nonce);
        context
    }

    #[test]
    fn test_first_use_passes_second_fails() {
        let inspector = NonceStoreInspector::new(Arc::new(InMemoryNonceStore::new()));
        let mut first = context("key", "1");
        let mut second = context("key", "1");

        inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut first)
            .unwrap();
        let err = inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut second)
            .unwrap_err();

        assert_eq!(err.to_string(), "The nonce value \"1\" has already been used");
        assert_eq!(err.report().unwrap().problem, Some(Problem::NonceUsed));
    }

    #[test]
    fn test_nonces_are_per_consumer() {
        let inspector = NonceStoreInspector::new(Arc::new(InMemoryNonceStore::new()));

        inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context("a", "1"))
            .unwrap();
        inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context("b", "1"))
            .unwrap();
    }

    #[test]
    fn test_missing_nonce() {
        let inspector = NonceStoreInspector::new(Arc::new(InMemoryNonceStore::new()));
        let mut context = OAuthContext::new();
        context.set_consumer_key("key");

        let err = inspector
            .inspect_context(ProviderPhase::GrantRequestToken, &mut context)
            .unwrap_err();

        assert_eq!(err.to_string(), "Missing required parameter : oauth_nonce");
    }
}
