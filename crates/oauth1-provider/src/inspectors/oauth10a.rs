use std::sync::Arc;

use oauth1_config::ProviderConfig;
use oauth1_core::parameters::names;
use oauth1_core::{Error, OAuthContext, OAuthError};

use super::ContextInspector;
use crate::store::{ProviderPhase, TokenStore};

/// OAuth 1.0a rules: a callback when granting a request token, and the
/// stored verifier when exchanging it.
pub struct OAuth10aInspector {
    token_store: Arc<dyn TokenStore>,
    require_callback: bool,
}

impl OAuth10aInspector {
    pub fn new(token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            token_store,
            require_callback: true,
        }
    }

    pub fn from_config(token_store: Arc<dyn TokenStore>, config: &ProviderConfig) -> Self {
        Self::new(token_store).with_callback_required(config.require_callback)
    }

    #[must_use]
    pub fn with_callback_required(mut self, required: bool) -> Self {
        self.require_callback = required;
        self
    }

    fn validate_callback(&self, context: &OAuthContext) -> Result<(), Error> {
        if self.require_callback && context.callback_url().is_none_or(str::is_empty) {
            return Err(OAuthError::missing_required_parameter(names::OAUTH_CALLBACK).into());
        }
        Ok(())
    }

    fn validate_verifier(&self, context: &OAuthContext) -> Result<(), Error> {
        let actual = context
            .verifier()
            .filter(|verifier| !verifier.is_empty())
            .ok_or_else(|| OAuthError::missing_required_parameter(names::OAUTH_VERIFIER))?;

        let expected = self
            .token_store
            .verification_code_for_request_token(context)?;
        if expected.as_deref() != Some(actual.trim()) {
            return Err(OAuthError::rejected_parameter(names::OAUTH_VERIFIER).into());
        }
        Ok(())
    }
}

impl ContextInspector for OAuth10aInspector {
    fn inspect_context(
        &self,
        phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        match phase {
            ProviderPhase::GrantRequestToken => self.validate_callback(context),
            ProviderPhase::ExchangeRequestTokenForAccessToken => self.validate_verifier(context),
            _ => Ok(()),
        }
    }
}
