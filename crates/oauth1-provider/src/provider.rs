//! The provider entry points, one per protocol step.

use std::sync::Arc;

use oauth1_core::{Error, OAuthContext, OAuthError, Token};
use tracing::{debug, warn};

use crate::inspectors::ContextInspector;
use crate::store::{ProviderPhase, RequestForAccessStatus, TokenStore};

/// Verifies inbound requests and drives the token store.
///
/// Every entry point rejects a transmitted `oauth_token_secret`, puts the
/// stored token secret into the context where the phase has one, runs the
/// inspectors in order and then performs the phase's store operation.
pub struct OAuthProvider {
    token_store: Arc<dyn TokenStore>,
    inspectors: Vec<Box<dyn ContextInspector>>,
}

impl OAuthProvider {
    pub fn new(token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            token_store,
            inspectors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_inspector(mut self, inspector: impl ContextInspector + 'static) -> Self {
        self.add_inspector(inspector);
        self
    }

    /// Append an inspector to the end of the pipeline.
    pub fn add_inspector(&mut self, inspector: impl ContextInspector + 'static) {
        self.inspectors.push(Box::new(inspector));
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.token_store
    }

    /// Issue a request token (temporary credentials).
    ///
    /// # Errors
    ///
    /// Rejects a request that already carries `oauth_token`, then any
    /// inspector or store failure.
    pub fn grant_request_token(&self, context: &mut OAuthContext) -> Result<Token, Error> {
        if context.token().is_some() {
            return Err(OAuthError::token_present_on_request_token_request().into());
        }
        self.inspect_request(ProviderPhase::GrantRequestToken, context)?;
        let token = self.token_store.create_request_token(context)?;
        debug!(consumer_key = %token.consumer_key, "granted request token");
        Ok(token)
    }

    /// Exchange an authorized request token for its access token.
    ///
    /// The request token is consumed before the approval status is checked,
    /// so a pending or denied token cannot be retried.
    ///
    /// # Errors
    ///
    /// Fails when access is pending or denied, or on any inspector or store
    /// failure.
    pub fn exchange_request_token_for_access_token(
        &self,
        context: &mut OAuthContext,
    ) -> Result<Token, Error> {
        self.inspect_request(ProviderPhase::ExchangeRequestTokenForAccessToken, context)?;
        self.token_store.consume_request_token(context)?;

        match self.token_store.status_of_request_for_access(context)? {
            RequestForAccessStatus::Granted => {}
            RequestForAccessStatus::Unknown => {
                return Err(OAuthError::access_not_yet_granted().into());
            }
            RequestForAccessStatus::Denied => return Err(OAuthError::access_denied().into()),
        }

        let token = self.token_store.access_token_for_request_token(context)?;
        debug!(consumer_key = %token.consumer_key, "exchanged request token");
        Ok(token)
    }

    /// Issue an access token directly from xAuth credentials.
    ///
    /// # Errors
    ///
    /// Returns any inspector or store failure.
    pub fn create_access_token(&self, context: &mut OAuthContext) -> Result<Token, Error> {
        self.inspect_request(ProviderPhase::CreateAccessToken, context)?;
        self.token_store.create_access_token(context)
    }

    /// Authorize a request for a protected resource.
    ///
    /// # Errors
    ///
    /// Fails for an unknown or expired access token, or any inspector
    /// failure.
    pub fn access_protected_resource_request(
        &self,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        self.inspect_request(ProviderPhase::AccessProtectedResourceRequest, context)?;
        self.token_store.consume_access_token(context)
    }

    /// Replace an access token using its session handle.
    ///
    /// # Errors
    ///
    /// Returns any inspector or store failure.
    pub fn renew_access_token(&self, context: &mut OAuthContext) -> Result<Token, Error> {
        self.inspect_request(ProviderPhase::RenewAccessToken, context)?;
        self.token_store.renew_access_token(context)
    }

    fn inspect_request(
        &self,
        phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        if context.token_secret().is_some_and(|secret| !secret.is_empty()) {
            return Err(OAuthError::token_secret_transmitted().into());
        }
        self.add_stored_token_secret(phase, context)?;

        for inspector in &self.inspectors {
            debug!(inspector = inspector.name(), ?phase, "inspecting request");
            if let Err(error) = inspector.inspect_context(phase, context) {
                warn!(
                    inspector = inspector.name(),
                    problem = error
                        .report()
                        .and_then(|report| report.problem.as_ref())
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    consumer_key = context.consumer_key().unwrap_or_default(),
                    "request rejected"
                );
                return Err(error);
            }
        }
        Ok(())
    }

    fn add_stored_token_secret(
        &self,
        phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error> {
        let secret = match phase {
            ProviderPhase::ExchangeRequestTokenForAccessToken => {
                self.token_store.request_token_secret(context)?
            }
            ProviderPhase::AccessProtectedResourceRequest | ProviderPhase::RenewAccessToken => {
                self.token_store.access_token_secret(context)?
            }
            ProviderPhase::GrantRequestToken | ProviderPhase::CreateAccessToken => return Ok(()),
        };
        context.set_token_secret(&secret);
        Ok(())
    }
}

impl std::fmt::Debug for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inspectors: Vec<_> = self.inspectors.iter().map(|i| i.name()).collect();
        f.debug_struct("OAuthProvider")
            .field("inspectors", &inspectors)
            .finish_non_exhaustive()
    }
}
