//! OAuth Problem Reporting extension: problem codes and report formatting.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::encoding::{format_query_string, parse_form_encoded, url_decode, url_encode};
use crate::error::Error;
use crate::parameters::names;

/// Machine-readable `oauth_problem` codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Problem {
    VersionRejected,
    ParameterAbsent,
    ParameterRejected,
    TimestampRefused,
    NonceUsed,
    SignatureMethodRejected,
    SignatureInvalid,
    ConsumerKeyUnknown,
    ConsumerKeyRejected,
    ConsumerKeyRefused,
    TokenUsed,
    TokenExpired,
    TokenRevoked,
    TokenRejected,
    AdditionalAuthorizationRequired,
    PermissionUnknown,
    PermissionDenied,
    UserRefused,
    /// A code outside the registered set, kept verbatim.
    Other(String),
}

impl Problem {
    pub fn as_str(&self) -> &str {
        match self {
            Self::VersionRejected => "version_rejected",
            Self::ParameterAbsent => "parameter_absent",
            Self::ParameterRejected => "parameter_rejected",
            Self::TimestampRefused => "timestamp_refused",
            Self::NonceUsed => "nonce_used",
            Self::SignatureMethodRejected => "signature_method_rejected",
            Self::SignatureInvalid => "signature_invalid",
            Self::ConsumerKeyUnknown => "consumer_key_unknown",
            Self::ConsumerKeyRejected => "consumer_key_rejected",
            Self::ConsumerKeyRefused => "consumer_key_refused",
            Self::TokenUsed => "token_used",
            Self::TokenExpired => "token_expired",
            Self::TokenRevoked => "token_revoked",
            Self::TokenRejected => "token_rejected",
            Self::AdditionalAuthorizationRequired => "additional_authorization_required",
            Self::PermissionUnknown => "permission_unknown",
            Self::PermissionDenied => "permission_denied",
            Self::UserRefused => "user_refused",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for Problem {
    fn from(code: &str) -> Self {
        match code {
            "version_rejected" => Self::VersionRejected,
            "parameter_absent" => Self::ParameterAbsent,
            "parameter_rejected" => Self::ParameterRejected,
            "timestamp_refused" => Self::TimestampRefused,
            "nonce_used" => Self::NonceUsed,
            "signature_method_rejected" => Self::SignatureMethodRejected,
            "signature_invalid" => Self::SignatureInvalid,
            "consumer_key_unknown" => Self::ConsumerKeyUnknown,
            "consumer_key_rejected" => Self::ConsumerKeyRejected,
            "consumer_key_refused" => Self::ConsumerKeyRefused,
            "token_used" => Self::TokenUsed,
            "token_expired" => Self::TokenExpired,
            "token_revoked" => Self::TokenRevoked,
            "token_rejected" => Self::TokenRejected,
            "additional_authorization_required" => Self::AdditionalAuthorizationRequired,
            "permission_unknown" => Self::PermissionUnknown,
            "permission_denied" => Self::PermissionDenied,
            "user_refused" => Self::UserRefused,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured OAuth problem report.
///
/// Serialized as `application/x-www-form-urlencoded` in this field order:
/// `oauth_problem`, `oauth_problem_advice`, `oauth_parameters_absent`,
/// `oauth_parameters_rejected`, `oauth_acceptable_timestamps`,
/// `oauth_acceptable_versions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemReport {
    pub problem: Option<Problem>,
    pub problem_advice: Option<String>,
    pub parameters_absent: Vec<String>,
    pub parameters_rejected: Vec<String>,
    /// Acceptable timestamp window as (from, to).
    pub acceptable_timestamps: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Acceptable protocol versions as (from, to).
    pub acceptable_versions: Option<(String, String)>,
}

impl ProblemReport {
    /// Create a report for `problem` with optional human-readable advice.
    pub fn new(problem: Problem, advice: impl Into<String>) -> Self {
        let advice = advice.into();
        Self {
            problem: Some(problem),
            problem_advice: (!advice.is_empty()).then_some(advice),
            ..Self::default()
        }
    }

    /// Parse a form-encoded problem report.
    ///
    /// Unknown fields are ignored and malformed ranges are dropped.
    pub fn parse(formatted: &str) -> Self {
        let parameters = parse_form_encoded(formatted);

        let split_names = |value: Option<&str>| -> Vec<String> {
            value
                .map(|names| {
                    names
                        .split('&')
                        .filter(|name| !name.is_empty())
                        .map(url_decode)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            problem: parameters
                .get(names::OAUTH_PROBLEM)
                .filter(|problem| !problem.is_empty())
                .map(Problem::from),
            problem_advice: parameters
                .get(names::OAUTH_PROBLEM_ADVICE)
                .map(ToOwned::to_owned),
            parameters_absent: split_names(parameters.get(names::OAUTH_PARAMETERS_ABSENT)),
            parameters_rejected: split_names(parameters.get(names::OAUTH_PARAMETERS_REJECTED)),
            acceptable_timestamps: parameters
                .get(names::OAUTH_ACCEPTABLE_TIMESTAMPS)
                .and_then(parse_timestamp_range),
            acceptable_versions: parameters
                .get(names::OAUTH_ACCEPTABLE_VERSIONS)
                .and_then(|range| range.split_once('-'))
                .map(|(from, to)| (from.to_owned(), to.to_owned())),
        }
    }

    /// Serialize the report.
    ///
    /// Fails when no problem code is set.
    pub fn format(&self) -> Result<String, Error> {
        let problem = self.problem.as_ref().ok_or(Error::EmptyProblem)?;

        let mut fields: Vec<(&str, String)> = vec![(names::OAUTH_PROBLEM, problem.to_string())];

        if let Some(advice) = &self.problem_advice {
            fields.push((names::OAUTH_PROBLEM_ADVICE, advice.replace("\r\n", "\n")));
        }
        if !self.parameters_absent.is_empty() {
            fields.push((
                names::OAUTH_PARAMETERS_ABSENT,
                join_names(&self.parameters_absent),
            ));
        }
        if !self.parameters_rejected.is_empty() {
            fields.push((
                names::OAUTH_PARAMETERS_REJECTED,
                join_names(&self.parameters_rejected),
            ));
        }
        if let Some((from, to)) = &self.acceptable_timestamps {
            fields.push((
                names::OAUTH_ACCEPTABLE_TIMESTAMPS,
                format!("{}-{}", from.timestamp(), to.timestamp()),
            ));
        }
        if let Some((from, to)) = &self.acceptable_versions {
            fields.push((names::OAUTH_ACCEPTABLE_VERSIONS, format!("{from}-{to}")));
        }

        Ok(format_query_string(
            fields.iter().map(|(key, value)| (*key, value.as_str())),
        ))
    }
}

fn join_names(names: &[String]) -> String {
    names
        .iter()
        .map(|name| url_encode(name))
        .collect::<Vec<_>>()
        .join("&")
}

fn parse_timestamp_range(range: &str) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (from, to) = range.split_once('-')?;
    let from = DateTime::from_timestamp(from.trim().parse().ok()?, 0)?;
    let to = DateTime::from_timestamp(to.trim().parse().ok()?, 0)?;
    Some((from, to))
}
