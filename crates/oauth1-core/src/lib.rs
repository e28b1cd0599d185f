//! OAuth 1.0 / 1.0a protocol core.
//!
//! Shared by the consumer and provider crates:
//! - [`OAuthContext`]: the parameters of one request and its signature base
//! - [`OAuthContextSigner`]: PLAINTEXT, HMAC-SHA1 and RSA-SHA1 signing
//! - [`OAuthContextBuilder`]: contexts from inbound requests
//! - [`ProblemReport`] and [`OAuthError`]: structured protocol failures
//! - [`Token`] types and the token endpoint response format

mod builder;
mod compare;
mod context;
pub mod encoding;
mod error;
pub mod key;
pub mod parameters;
mod problem;
mod signing;
#[cfg(any(test, feature = "mock"))]
pub mod testing;
mod token;

pub use builder::{InboundRequest, OAuthContextBuilder};
pub use compare::constant_time_eq;
pub use context::{OAUTH_VERSION, OAuthContext, ParameterLocation};
pub use error::{Error, KeyError, OAuthError};
pub use parameters::ParameterCollection;
pub use problem::{Problem, ProblemReport};
pub use signing::{OAuthContextSigner, SignatureMethod, SigningContext};
pub use token::{AccessToken, RequestToken, Token, TokenResponse};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
