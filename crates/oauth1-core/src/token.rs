//! Tokens and the token endpoint response format.

use chrono::{DateTime, Utc};

use crate::encoding::{format_query_string, parse_form_encoded};
use crate::parameters::{ParameterCollection, names};

/// A token and its secret as held by a consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub consumer_key: String,
    pub realm: Option<String>,
    pub token: String,
    pub token_secret: String,
    /// Handle for renewing an access token, when the provider issues one.
    pub session_handle: Option<String>,
}

impl Token {
    pub fn new(
        consumer_key: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            token: token.into(),
            token_secret: token_secret.into(),
            ..Self::default()
        }
    }
}

/// A provider-issued request token (temporary credentials).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestToken {
    pub token: Token,
    pub callback_url: Option<String>,
    /// Verifier handed to the user after authorization (1.0a).
    pub verifier: Option<String>,
    /// Set once the token has been exchanged.
    pub used_up: bool,
    pub access_denied: bool,
    /// Access token bound to this request token once the user approves.
    pub access_token: Option<AccessToken>,
}

/// A provider-issued access token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessToken {
    pub token: Token,
    pub expiry_date: Option<DateTime<Utc>>,
    pub user_name: Option<String>,
    pub roles: Vec<String>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now)
    }
}

/// Body of a request token or access token response.
///
/// `oauth_token=..&oauth_token_secret=..[&oauth_callback_confirmed=true][&oauth_session_handle=..]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: Option<String>,
    pub token_secret: Option<String>,
    pub session_handle: Option<String>,
    pub callback_confirmed: bool,
    /// Every parameter of the response, including provider extensions.
    pub parameters: ParameterCollection,
}

impl TokenResponse {
    /// Parse a form-encoded response body. Empty values count as absent.
    pub fn parse(body: &str) -> Self {
        let parameters = parse_form_encoded(body.trim());
        let non_empty = |name: &str| {
            parameters
                .get(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        };

        Self {
            token: non_empty(names::OAUTH_TOKEN),
            token_secret: non_empty(names::OAUTH_TOKEN_SECRET),
            session_handle: non_empty(names::OAUTH_SESSION_HANDLE),
            callback_confirmed: parameters.get(names::OAUTH_CALLBACK_CONFIRMED) == Some("true"),
            parameters,
        }
    }

    /// Render the response for `token`.
    pub fn format(token: &Token, callback_confirmed: bool) -> String {
        let mut fields = vec![
            (names::OAUTH_TOKEN, token.token.as_str()),
            (names::OAUTH_TOKEN_SECRET, token.token_secret.as_str()),
        ];
        if callback_confirmed {
            fields.push((names::OAUTH_CALLBACK_CONFIRMED, "true"));
        }
        if let Some(session_handle) = &token.session_handle {
            fields.push((names::OAUTH_SESSION_HANDLE, session_handle.as_str()));
        }
        format_query_string(fields)
    }

    /// Build a consumer token, if the response carried one.
    pub fn into_token(self, consumer_key: &str) -> Option<Token> {
        Some(Token {
            consumer_key: consumer_key.to_owned(),
            realm: None,
            token: self.token?,
            token_secret: self.token_secret.unwrap_or_default(),
            session_handle: self.session_handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_response() {
        let response = TokenResponse::parse(
            "oauth_token=abc123&oauth_token_secret=xyz%3D789&oauth_callback_confirmed=true\n",
        );

        assert_eq!(response.token.as_deref(), Some("abc123"));
        assert_eq!(response.token_secret.as_deref(), Some("xyz=789"));
        assert!(response.callback_confirmed);
        assert_eq!(response.session_handle, None);
    }

    #[test]
    fn test_parse_response_empty_values_are_absent() {
        let response = TokenResponse::parse("oauth_token=&oauth_token_secret=s");

        assert_eq!(response.token, None);
        assert!(!response.callback_confirmed);
        assert_eq!(response.into_token("key"), None);
    }

    #[test]
    fn test_format_response() {
        let mut token = Token::new("key", "to ken", "sec/ret");
        token.session_handle = Some("handle".to_owned());

        assert_eq!(
            TokenResponse::format(&token, true),
            "oauth_token=to%20ken&oauth_token_secret=sec%2Fret&oauth_callback_confirmed=true&oauth_session_handle=handle"
        );
    }

    #[test]
    fn test_format_then_parse() {
        let token = Token::new("key", "token", "secret");
        let response = TokenResponse::parse(&TokenResponse::format(&token, false));

        assert_eq!(response.into_token("key"), Some(token));
    }

    #[test]
    fn test_access_token_expiry() {
        let now = Utc::now();
        let mut access_token = AccessToken::default();
        assert!(!access_token.is_expired(now));

        access_token.expiry_date = Some(now - TimeDelta::seconds(1));
        assert!(access_token.is_expired(now));

        access_token.expiry_date = Some(now + TimeDelta::days(20));
        assert!(!access_token.is_expired(now));
    }
}
