//! OAuth 1.0 / 1.0a provider.
//!
//! [`OAuthProvider`] verifies inbound requests through a pipeline of
//! [`ContextInspector`]s and then performs the step on a [`TokenStore`]:
//!
//! ```text
//! grant_request_token                      -> request token
//! exchange_request_token_for_access_token  -> access token (after approval)
//! create_access_token                      -> access token (xAuth)
//! access_protected_resource_request        -> ok / error
//! renew_access_token                       -> replacement access token
//! ```
//!
//! Build the context with [`oauth1_core::OAuthContextBuilder`]. Failures
//! are [`oauth1_core::Error`]s whose problem report can be sent back to the
//! consumer. The [`memory`] module has reference stores.

pub mod inspectors;
pub mod memory;
mod provider;
mod store;
#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use inspectors::ContextInspector;
pub use provider::OAuthProvider;
pub use store::{ConsumerStore, NonceStore, ProviderPhase, RequestForAccessStatus, TokenStore};
