use std::sync::Arc;

use oauth1_core::{Error, OAuthContext, OAuthError};

use super::ContextInspector;
use crate::store::{ConsumerStore, ProviderPhase};

/// Rejects consumer key and realm pairs the store does not know.
pub struct ConsumerValidationInspector {
    consumer_store: Arc<dyn ConsumerStore>,
}

impl ConsumerValidationInspector {
    pub fn new(consumer_store: Arc<dyn ConsumerStore>) -> Self {
        Self { consumer_store }
    }
}

impl ContextInspector for ConsumerValidationInspector {
    fn inspect_context(
        &self,
        _phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        if self.consumer_store.is_consumer(context)? {
            return Ok(());
        }
        Err(OAuthError::unknown_consumer(context.realm(), context.consumer_key()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestConsumerStore;
    use oauth1_core::Problem;
    use pretty_assertions::assert_eq;

    fn inspect(consumer_key: &str, realm: &str) -> Result<(), Error> {
        let mut context = OAuthContext::new();
        context.set_consumer_key(consumer_key);
        context.set_realm(realm);
        ConsumerValidationInspector::new(Arc::new(TestConsumerStore))
            .inspect_context(ProviderPhase::AccessProtectedResourceRequest, &mut context)
    }

    #[test]
    fn test_known_consumer_passes() {
        assert!(inspect("key", "").is_ok());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = inspect("invalid", "").unwrap_err();

        assert_eq!(err.to_string(), "Unknown Consumer (Realm: , Key: invalid)");
        assert_eq!(err.report().unwrap().problem, Some(Problem::ConsumerKeyUnknown));
    }

    #[test]
    fn test_unknown_realm_rejected() {
        let err = inspect("key", "elsewhere").unwrap_err();

        assert_eq!(err.to_string(), "Unknown Consumer (Realm: elsewhere, Key: key)");
    }
}
