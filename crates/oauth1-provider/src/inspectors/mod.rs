//! Checks run on every inbound request before the token store acts.
//!
//! Inspectors run in registration order and the first failure stops the
//! pipeline. The usual order is signature, nonce, timestamp, consumer, then
//! the phase-specific extensions.

mod body_hash;
mod consumer;
mod nonce;
mod oauth10a;
mod signature;
mod timestamp;
mod xauth;

pub use body_hash::BodyHashValidationInspector;
pub use consumer::ConsumerValidationInspector;
pub use nonce::NonceStoreInspector;
pub use oauth10a::OAuth10aInspector;
pub use signature::SignatureValidationInspector;
pub use timestamp::TimestampRangeInspector;
pub use xauth::XAuthValidationInspector;

use oauth1_core::{Error, OAuthContext};

use crate::store::ProviderPhase;

/// One check in the provider pipeline.
pub trait ContextInspector: Send + Sync {
    /// Reject the request with a protocol error, or let it through.
    fn inspect_context(
        &self,
        phase: ProviderPhase,
        context: &mut OAuthContext,
    ) -> Result<(), Error>;

    /// Name used in log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("inspector")
    }
}
