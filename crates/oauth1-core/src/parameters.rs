//! Ordered name/value collections and well-known OAuth parameter names.

use std::fmt;

/// Well-known protocol parameter names.
pub mod names {
    pub const OAUTH_BODY_HASH: &str = "oauth_body_hash";
    pub const OAUTH_CALLBACK: &str = "oauth_callback";
    pub const OAUTH_CALLBACK_CONFIRMED: &str = "oauth_callback_confirmed";
    pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
    pub const OAUTH_NONCE: &str = "oauth_nonce";
    pub const OAUTH_SESSION_HANDLE: &str = "oauth_session_handle";
    pub const OAUTH_SIGNATURE: &str = "oauth_signature";
    pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
    pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
    pub const OAUTH_TOKEN: &str = "oauth_token";
    pub const OAUTH_TOKEN_SECRET: &str = "oauth_token_secret";
    pub const OAUTH_VERIFIER: &str = "oauth_verifier";
    pub const OAUTH_VERSION: &str = "oauth_version";
    pub const REALM: &str = "realm";
    pub const X_AUTH_MODE: &str = "x_auth_mode";
    pub const X_AUTH_PASSWORD: &str = "x_auth_password";
    pub const X_AUTH_USERNAME: &str = "x_auth_username";

    pub const OAUTH_PROBLEM: &str = "oauth_problem";
    pub const OAUTH_PROBLEM_ADVICE: &str = "oauth_problem_advice";
    pub const OAUTH_PARAMETERS_ABSENT: &str = "oauth_parameters_absent";
    pub const OAUTH_PARAMETERS_REJECTED: &str = "oauth_parameters_rejected";
    pub const OAUTH_ACCEPTABLE_TIMESTAMPS: &str = "oauth_acceptable_timestamps";
    pub const OAUTH_ACCEPTABLE_VERSIONS: &str = "oauth_acceptable_versions";
}

/// An ordered multi-map of string parameters.
///
/// Insertion order is preserved and a name may appear more than once.
/// [`set`](Self::set) replaces every value for a name with a single one,
/// [`append`](Self::append) keeps existing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterCollection {
    entries: Vec<(String, String)>,
}

impl ParameterCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values stored under `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    /// Replace all values for `name` with `value`.
    ///
    /// The entry keeps the position of the first existing value, or is
    /// appended when the name is new.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter().position(|(key, _)| *key == name) {
            Some(index) => {
                self.entries[index].1 = value;
                let mut position = 0;
                self.entries.retain(|(key, _)| {
                    let keep = *key != name || position == index;
                    position += 1;
                    keep
                });
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Remove every value for `name`.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(key, _)| key != name);
    }

    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.append(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Iterate over entries whose name is not in `excluded`.
    pub fn iter_excluding<'a>(
        &'a self,
        excluded: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.iter().filter(move |(key, _)| !excluded.contains(key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterCollection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl IntoIterator for ParameterCollection {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for ParameterCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (key, value)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
