//! Error types for OAuth signing and verification.

use std::fmt;
use std::str::Utf8Error;

use chrono::{DateTime, Utc};

use crate::parameters::names;
use crate::problem::{Problem, ProblemReport};

/// Error from building, signing or validating an OAuth request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Protocol failure carrying a problem report.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The context has no request method.
    #[error("the request method has not been assigned")]
    RequestMethodNotAssigned,

    /// The context has no request URL.
    #[error("the request URL has not been assigned")]
    RequestUrlNotAssigned,

    /// RSA-SHA1 signing was requested without a private key.
    #[error("RSA-SHA1 signing requires a private key")]
    MissingRsaKey,

    /// RSA signature creation failed.
    #[error("RSA signing failed")]
    RsaSigning(#[from] rsa::signature::Error),

    /// HMAC key setup failed.
    #[error("invalid HMAC key")]
    HmacKey(#[from] hmac::digest::InvalidLength),

    /// Request URL could not be parsed.
    #[error("invalid URL")]
    InvalidUrl(#[from] url::ParseError),

    /// A problem report was formatted without a problem code.
    #[error("a problem report requires a problem")]
    EmptyProblem,
}

impl Error {
    /// Problem report when this is a protocol error.
    pub fn report(&self) -> Option<&ProblemReport> {
        match self {
            Self::OAuth(error) => Some(error.report()),
            _ => None,
        }
    }
}

/// Structured protocol error.
///
/// Displayed as the problem advice when present, otherwise the problem code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthError {
    report: ProblemReport,
}

impl OAuthError {
    pub fn new(problem: Problem, advice: impl Into<String>) -> Self {
        Self {
            report: ProblemReport::new(problem, advice),
        }
    }

    pub fn from_report(report: ProblemReport) -> Self {
        Self { report }
    }

    pub fn report(&self) -> &ProblemReport {
        &self.report
    }

    pub fn into_report(self) -> ProblemReport {
        self.report
    }

    pub fn problem(&self) -> Option<&Problem> {
        self.report.problem.as_ref()
    }

    pub fn missing_required_parameter(parameter: &str) -> Self {
        let mut error = Self::new(
            Problem::ParameterAbsent,
            format!("Missing required parameter : {parameter}"),
        );
        error.report.parameters_absent.push(parameter.to_owned());
        error
    }

    pub fn rejected_parameter(parameter: &str) -> Self {
        let mut error = Self::new(
            Problem::ParameterRejected,
            format!("The parameter \"{parameter}\" was rejected"),
        );
        error.report.parameters_rejected.push(parameter.to_owned());
        error
    }

    pub fn token_secret_transmitted() -> Self {
        let mut error = Self::new(
            Problem::ParameterRejected,
            "The oauth_token_secret must not be transmitted to the provider.",
        );
        error
            .report
            .parameters_rejected
            .push(names::OAUTH_TOKEN_SECRET.to_owned());
        error
    }

    pub fn unknown_signature_method(method: &str) -> Self {
        Self::new(
            Problem::SignatureMethodRejected,
            format!("Unknown signature method \"{method}\""),
        )
    }

    /// The consumer has no secret or public key for `method`.
    pub fn signature_method_unavailable(method: &str) -> Self {
        Self::new(
            Problem::SignatureMethodRejected,
            format!("Signature method \"{method}\" is not available for this consumer"),
        )
    }

    pub fn failed_to_validate_signature() -> Self {
        Self::new(Problem::SignatureInvalid, "Failed to validate signature")
    }

    pub fn nonce_has_already_been_used(nonce: &str) -> Self {
        Self::new(
            Problem::NonceUsed,
            format!("The nonce value \"{nonce}\" has already been used"),
        )
    }

    pub fn unknown_consumer(realm: Option<&str>, consumer_key: Option<&str>) -> Self {
        Self::new(
            Problem::ConsumerKeyUnknown,
            format!(
                "Unknown Consumer (Realm: {}, Key: {})",
                realm.unwrap_or_default(),
                consumer_key.unwrap_or_default()
            ),
        )
    }

    pub fn token_already_consumed() -> Self {
        Self::new(
            Problem::TokenUsed,
            "The request token has already been consumed.",
        )
    }

    pub fn unknown_token(token: &str) -> Self {
        Self::new(
            Problem::TokenRejected,
            format!("The token \"{token}\" is not recognised"),
        )
    }

    pub fn token_expired() -> Self {
        Self::new(Problem::TokenExpired, "Token has expired")
    }

    pub fn access_not_yet_granted() -> Self {
        Self::new(
            Problem::PermissionUnknown,
            "The request for access has not yet been granted",
        )
    }

    pub fn access_denied() -> Self {
        Self::new(
            Problem::PermissionDenied,
            "The request for access was denied",
        )
    }

    pub fn token_present_on_request_token_request() -> Self {
        let mut error = Self::new(
            Problem::ParameterRejected,
            "When obtaining a request token, you must not supply the oauth_token parameter",
        );
        error
            .report
            .parameters_rejected
            .push(names::OAUTH_TOKEN.to_owned());
        error
    }

    pub fn failed_to_validate_body_hash() -> Self {
        Self::new(Problem::SignatureInvalid, "Failed to validate body hash")
    }

    pub fn unexpected_body_hash_in_form_request() -> Self {
        Self::new(
            Problem::ParameterRejected,
            "Encountered unexpected oauth_body_hash value in form-encoded request",
        )
    }

    /// `oauth_timestamp` older than the accepted window.
    pub fn timestamp_too_old(
        max_before_now_secs: i64,
        acceptable: (DateTime<Utc>, DateTime<Utc>),
    ) -> Self {
        Self::timestamp_refused(
            format!(
                "The timestamp is too old, it must be at most {max_before_now_secs} seconds before the server's current date and time"
            ),
            acceptable,
        )
    }

    /// `oauth_timestamp` newer than the accepted window.
    pub fn timestamp_too_far_in_future(
        max_after_now_secs: i64,
        acceptable: (DateTime<Utc>, DateTime<Utc>),
    ) -> Self {
        Self::timestamp_refused(
            format!(
                "The timestamp is too far in the future, it must be at most {max_after_now_secs} seconds after the server's current date and time"
            ),
            acceptable,
        )
    }

    fn timestamp_refused(advice: String, acceptable: (DateTime<Utc>, DateTime<Utc>)) -> Self {
        let mut error = Self::new(Problem::TimestampRefused, advice);
        error.report.acceptable_timestamps = Some(acceptable);
        error
    }

    pub fn empty_x_auth_mode() -> Self {
        Self::x_auth_parameter_absent(names::X_AUTH_MODE)
    }

    pub fn invalid_x_auth_mode() -> Self {
        let mut error = Self::new(
            Problem::ParameterRejected,
            format!("The {} parameter is invalid", names::X_AUTH_MODE),
        );
        error.report.parameters_rejected.push(names::X_AUTH_MODE.to_owned());
        error
    }

    pub fn empty_x_auth_username() -> Self {
        Self::x_auth_parameter_absent(names::X_AUTH_USERNAME)
    }

    pub fn empty_x_auth_password() -> Self {
        Self::x_auth_parameter_absent(names::X_AUTH_PASSWORD)
    }

    pub fn failed_x_auth_authentication() -> Self {
        Self::new(
            Problem::PermissionDenied,
            "Authentication failed with the specified username and password",
        )
    }

    fn x_auth_parameter_absent(parameter: &str) -> Self {
        let mut error = Self::new(
            Problem::ParameterAbsent,
            format!("The {parameter} parameter must be present"),
        );
        error.report.parameters_absent.push(parameter.to_owned());
        error
    }
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.report.problem_advice, &self.report.problem) {
            (Some(advice), _) => f.write_str(advice),
            (None, Some(problem)) => write!(f, "OAuth problem: {problem}"),
            (None, None) => f.write_str("OAuth problem"),
        }
    }
}

impl std::error::Error for OAuthError {}

/// RSA key loading/parsing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeyError {
    /// Key file could not be read.
    #[error("failed to read key file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid UTF-8 in key.
    #[error("invalid UTF-8 in key")]
    InvalidUtf8(#[from] Utf8Error),

    /// PKCS#1 key parsing error.
    #[error("PKCS#1 key error")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// PKCS#8 key parsing error (returned when both formats fail).
    #[error("PKCS#8 key error")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    /// SubjectPublicKeyInfo parsing error.
    #[error("public key error")]
    PublicKey(#[from] rsa::pkcs8::spki::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_uses_advice() {
        let error = OAuthError::missing_required_parameter("oauth_verifier");
        assert_eq!(
            error.to_string(),
            "Missing required parameter : oauth_verifier"
        );
        assert_eq!(error.problem(), Some(&Problem::ParameterAbsent));
        assert_eq!(
            error.report().parameters_absent,
            vec!["oauth_verifier".to_owned()]
        );
    }

    #[test]
    fn test_display_falls_back_to_problem() {
        let error = OAuthError::from_report(ProblemReport {
            problem: Some(Problem::TokenRevoked),
            ..ProblemReport::default()
        });
        assert_eq!(error.to_string(), "OAuth problem: token_revoked");
    }

    #[test]
    fn test_x_auth_messages() {
        assert_eq!(
            OAuthError::empty_x_auth_mode().to_string(),
            "The x_auth_mode parameter must be present"
        );
        assert_eq!(
            OAuthError::invalid_x_auth_mode().to_string(),
            "The x_auth_mode parameter is invalid"
        );
        assert_eq!(
            OAuthError::empty_x_auth_password().report().parameters_absent,
            vec!["x_auth_password".to_owned()]
        );
    }

    #[test]
    fn test_unknown_consumer_message() {
        let error = OAuthError::unknown_consumer(None, Some("key"));
        assert_eq!(error.to_string(), "Unknown Consumer (Realm: , Key: key)");
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error: Error = OAuthError::nonce_has_already_been_used("1").into();
        assert_eq!(
            error.to_string(),
            "The nonce value \"1\" has already been used"
        );
        assert!(error.report().is_some());
    }
}
