//! Percent-encoding and normalization rules for OAuth 1.0 (RFC 5849 Section 3.6).

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::parameters::ParameterCollection;

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a string per RFC 3986 with uppercase hex digits.
///
/// Everything outside the unreserved set is escaped, including `!*'()`.
pub fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Decode a form-encoded value (`+` is a space, then percent-decoding).
pub fn url_decode(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Normalize a URL to `scheme://host[:port]path`.
///
/// Default ports (80 for http, 443 for https) are omitted, as are the query
/// and fragment. A bare `/` path is dropped.
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        normalized.push(':');
        normalized.push_str(&port.to_string());
    }
    if url.path() != "/" {
        normalized.push_str(url.path());
    }
    normalized
}

/// Build the normalized request parameter string used in the signature base.
///
/// Pairs are sorted by key (ordinal) and then by encoded value. Duplicate
/// keys are kept.
pub fn normalize_request_parameters<'a, I>(parameters: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut encoded: Vec<(String, String)> = parameters
        .into_iter()
        .map(|(key, value)| (url_encode(key), url_encode(value)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Join pairs as `key=encoded(value)` in input order.
///
/// Keys are written as-is.
pub fn format_query_string<'a, I>(parameters: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    parameters
        .into_iter()
        .map(|(key, value)| format!("{key}={}", url_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse an `application/x-www-form-urlencoded` string into a collection.
pub fn parse_form_encoded(input: &str) -> ParameterCollection {
    let input = input.strip_prefix('?').unwrap_or(input);
    url::form_urlencoded::parse(input.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Parse a query string, skipping `oauth_` and `x_auth_` parameters.
///
/// Values are kept raw (not decoded).
pub fn parse_non_oauth_query_parameters(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| !pair.starts_with("oauth_") && !pair.starts_with("x_auth_"))
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (pair.to_owned(), String::new()),
        })
        .collect()
}

/// Parse the parameters of an `Authorization: OAuth ...` header value.
///
/// A value that does not start with the `OAuth` scheme (case-insensitive)
/// yields no parameters.
pub fn parse_authorization_header(header: &str) -> Vec<(String, String)> {
    const SCHEME: &str = "OAuth";

    let header = header.trim();
    let has_scheme = header
        .get(..SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SCHEME));
    if !has_scheme {
        return Vec::new();
    }

    header[SCHEME.len()..]
        .split(',')
        .filter(|pair| !pair.is_empty())
        .map(parse_header_pair)
        .collect()
}

fn parse_header_pair(pair: &str) -> (String, String) {
    match pair.find('=') {
        Some(index) if index > 0 => {
            let key = pair[..index].trim();
            let value = strip_quotes(pair[index + 1..].trim());
            (key.to_owned(), url_decode(value))
        }
        _ => (pair.trim().to_owned(), String::new()),
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() > 1 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_url_encode_unreserved() {
        assert_eq!(url_encode("abcABC123"), "abcABC123");
        assert_eq!(url_encode("-._~"), "-._~");
    }

    #[test]
    fn test_url_encode_reserved() {
        assert_eq!(url_encode(" "), "%20");
        assert_eq!(url_encode("&"), "%26");
        assert_eq!(url_encode("="), "%3D");
        assert_eq!(url_encode("/"), "%2F");
        assert_eq!(url_encode("+"), "%2B");
    }

    #[test]
    fn test_url_encode_escapes_sub_delims() {
        assert_eq!(url_encode("!*'()"), "%21%2A%27%28%29");
    }

    #[test]
    fn test_url_encode_unicode() {
        assert_eq!(url_encode("caf\u{e9}"), "caf%C3%A9");
        assert_eq!(url_encode("\u{2603}"), "%E2%98%83");
    }

    #[test]
    fn test_url_encode_empty() {
        assert_eq!(url_encode(""), "");
    }

    #[test]
    fn test_url_encode_decode_round_trip() {
        let input = "Ladies + Gentlemen!*'() \u{e9}\u{2603}/?&=";
        let encoded = url_encode(input);
        assert_eq!(
            percent_decode_str(&encoded).decode_utf8_lossy(),
            input.to_owned()
        );
    }

    #[test]
    fn test_url_decode_plus_is_space() {
        assert_eq!(url_decode("a+b%2Bc"), "a b+c");
    }

    #[test]
    fn test_normalize_url_drops_default_port() {
        let url = Url::parse("http://example.com:80/resource?x=1#frag").unwrap();
        assert_eq!(normalize_url(&url), "http://example.com/resource");

        let url = Url::parse("https://example.com:443/resource").unwrap();
        assert_eq!(normalize_url(&url), "https://example.com/resource");
    }

    #[test]
    fn test_normalize_url_keeps_custom_port() {
        let url = Url::parse("http://example.com:8080/resource").unwrap();
        assert_eq!(normalize_url(&url), "http://example.com:8080/resource");
    }

    #[test]
    fn test_normalize_url_root_path() {
        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(normalize_url(&url), "http://example.com");
    }

    #[test]
    fn test_normalize_request_parameters_ordinal_sort() {
        let parameters = [("ZIP", "123"), ("CVV", "123"), ("ccid", "123")];
        assert_eq!(
            normalize_request_parameters(parameters),
            "CVV=123&ZIP=123&ccid=123"
        );
    }

    #[test]
    fn test_normalize_request_parameters_sorts_duplicate_values() {
        let parameters = [("a", "z"), ("a", "b"), ("a", "a b")];
        assert_eq!(
            normalize_request_parameters(parameters),
            "a=a%20b&a=b&a=z"
        );
    }

    #[test]
    fn test_normalize_request_parameters_is_stable() {
        let parameters = [("b", "2"), ("a", "1"), ("c", "3")];
        let first = normalize_request_parameters(parameters);
        let second = normalize_request_parameters(parameters);
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_query_string_keeps_order() {
        let parameters = [("oauth_token", "token"), ("oauth_callback", "http://x/y")];
        assert_eq!(
            format_query_string(parameters),
            "oauth_token=token&oauth_callback=http%3A%2F%2Fx%2Fy"
        );
    }

    #[test]
    fn test_parse_form_encoded() {
        let parameters = parse_form_encoded("?a=1&b=two+words&c=%26");
        assert_eq!(parameters.get("a"), Some("1"));
        assert_eq!(parameters.get("b"), Some("two words"));
        assert_eq!(parameters.get("c"), Some("&"));
    }

    #[test]
    fn test_parse_non_oauth_query_parameters() {
        let parameters =
            parse_non_oauth_query_parameters("?oauth_token=t&page=2&x_auth_mode=m&q=a%20b");
        assert_eq!(
            parameters,
            vec![
                ("page".to_owned(), "2".to_owned()),
                ("q".to_owned(), "a%20b".to_owned())
            ]
        );
    }

    #[test]
    fn test_parse_authorization_header() {
        let mut parameters = parse_authorization_header(
            r#"OAuth realm="http:\\somerealm.com", oauth_consumer_key="consumerKey""#,
        );
        parameters.sort();

        assert_eq!(
            parameters,
            vec![
                ("oauth_consumer_key".to_owned(), "consumerKey".to_owned()),
                ("realm".to_owned(), r"http:\\somerealm.com".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_authorization_header_decodes_values() {
        let parameters =
            parse_authorization_header(r#"OAuth oauth_signature="uZF3aYQFtyK0F1FFHY+w7/Be+m4=""#);
        assert_eq!(
            parameters,
            vec![(
                "oauth_signature".to_owned(),
                "uZF3aYQFtyK0F1FFHY w7/Be m4=".to_owned()
            )]
        );
    }

    #[test]
    fn test_parse_authorization_header_scheme_is_case_insensitive() {
        let parameters = parse_authorization_header("oauth oauth_nonce='abc'");
        assert_eq!(
            parameters,
            vec![("oauth_nonce".to_owned(), "abc".to_owned())]
        );
    }

    #[test]
    fn test_parse_authorization_header_without_scheme() {
        assert!(parse_authorization_header("Basic dXNlcjpwYXNz").is_empty());
        assert!(parse_authorization_header("").is_empty());
    }

    #[test]
    fn test_parse_authorization_header_value_contains_equals() {
        let parameters = parse_authorization_header("OAuth oauth_body_hash=\"abc%3D=\"");
        assert_eq!(
            parameters,
            vec![("oauth_body_hash".to_owned(), "abc==".to_owned())]
        );
    }

    #[test]
    fn test_parse_authorization_header_key_without_value() {
        let parameters = parse_authorization_header("OAuth flag, a=\"1\"");
        assert_eq!(
            parameters,
            vec![
                ("flag".to_owned(), String::new()),
                ("a".to_owned(), "1".to_owned())
            ]
        );
    }
}
