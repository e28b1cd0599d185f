//! OAuth 1.0 / 1.0a consumer.
//!
//! Signs outgoing requests and drives the token flows against a provider:
//!
//! ```text
//! get_request_token -> get_user_authorization_url_for_token -> (user approves)
//!     -> exchange_request_token_for_access_token -> request().get().for_url(..)
//! ```
//!
//! [`OAuthSession`] holds the endpoints and the access token,
//! [`ConsumerRequest`] builds and signs a single request, and
//! [`OAuthConsumerContext`] carries the consumer credentials. HTTP goes
//! through a [`Transport`]; [`UreqTransport`] is the default.

mod consumer_context;
mod error;
mod request;
mod session;
#[cfg(any(test, feature = "mock"))]
pub mod testing;
mod transport;

pub use consumer_context::{GuidNonceGenerator, NonceGenerator, OAuthConsumerContext};
pub use error::ConsumerError;
pub use request::ConsumerRequest;
pub use session::OAuthSession;
pub use transport::{RequestDescription, Transport, TransportResponse, UreqTransport};
