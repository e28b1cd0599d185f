//! Configuration management for OAuth 1.0a consumers and providers.
//!
//! Parses `oauth1.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `consumer.consumer_key`
//! - `consumer.consumer_secret`
//! - `consumer.private_key_file`
//! - `consumer.request_token_url`
//! - `consumer.user_authorize_url`
//! - `consumer.access_token_url`
//! - `consumer.callback_url`
//! - `consumer.access_token`
//! - `consumer.access_token_secret`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override consumer key.
    pub consumer_key: Option<String>,
    /// Override consumer secret.
    pub consumer_secret: Option<String>,
    /// Override signature method.
    pub signature_method: Option<String>,
    /// Override RSA private key file.
    pub private_key_file: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "oauth1.toml";

/// Signature method names accepted in `consumer.signature_method`.
const SIGNATURE_METHODS: [&str; 3] = ["PLAINTEXT", "HMAC-SHA1", "RSA-SHA1"];

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Consumer configuration (optional section).
    pub consumer: Option<ConsumerConfig>,
    /// Provider configuration.
    pub provider: ProviderConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Consumer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// OAuth consumer key.
    pub consumer_key: String,
    /// Consumer secret (HMAC-SHA1 and PLAINTEXT).
    #[serde(default)]
    pub consumer_secret: Option<String>,
    /// `PLAINTEXT`, `HMAC-SHA1` or `RSA-SHA1`.
    #[serde(default = "default_signature_method")]
    pub signature_method: String,
    /// PEM private key for RSA-SHA1, relative to the config file.
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,
    #[serde(default)]
    pub realm: Option<String>,
    /// Send protocol parameters in the `Authorization` header.
    #[serde(default = "default_true")]
    pub use_authorization_header: bool,
    #[serde(default)]
    pub request_token_url: Option<String>,
    #[serde(default)]
    pub user_authorize_url: Option<String>,
    #[serde(default)]
    pub access_token_url: Option<String>,
    /// Callback URL, `oob` or unset for out-of-band.
    #[serde(default)]
    pub callback_url: Option<String>,
    /// Previously issued access token, used together with
    /// `access_token_secret`.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub access_token_secret: Option<String>,
    /// Reject request tokens without `oauth_callback_confirmed=true`.
    #[serde(default)]
    pub callback_must_be_confirmed: bool,
    /// Sign `oauth_body_hash` for non form-encoded bodies.
    #[serde(default)]
    pub add_body_hashes: bool,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ConsumerConfig {
    /// Create a config with defaults for everything except the consumer key.
    #[must_use]
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: None,
            signature_method: default_signature_method(),
            private_key_file: None,
            realm: None,
            use_authorization_header: true,
            request_token_url: None,
            user_authorize_url: None,
            access_token_url: None,
            callback_url: None,
            access_token: None,
            access_token_secret: None,
            callback_must_be_confirmed: false,
            add_body_hashes: false,
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.consumer_key, "consumer.consumer_key")?;

        if !SIGNATURE_METHODS.contains(&self.signature_method.as_str()) {
            return Err(ConfigError::Validation(format!(
                "consumer.signature_method must be one of {}",
                SIGNATURE_METHODS.join(", ")
            )));
        }
        if self.signature_method == "RSA-SHA1" && self.private_key_file.is_none() {
            return Err(ConfigError::Validation(
                "consumer.private_key_file is required for RSA-SHA1".to_owned(),
            ));
        }

        for (url, field) in [
            (&self.request_token_url, "consumer.request_token_url"),
            (&self.user_authorize_url, "consumer.user_authorize_url"),
            (&self.access_token_url, "consumer.access_token_url"),
        ] {
            if let Some(url) = url {
                require_http_url(url, field)?;
            }
        }
        if let Some(callback) = &self.callback_url
            && !callback.is_empty()
            && !callback.eq_ignore_ascii_case("oob")
        {
            require_http_url(callback, "consumer.callback_url")?;
        }

        if self.access_token.is_some() != self.access_token_secret.is_some() {
            return Err(ConfigError::Validation(
                "consumer.access_token and consumer.access_token_secret must be set together"
                    .to_owned(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "consumer.timeout_secs cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.consumer_key = expand::expand_env(&self.consumer_key, "consumer.consumer_key")?;
        expand::expand_optional(&mut self.consumer_secret, "consumer.consumer_secret")?;
        expand::expand_optional(&mut self.request_token_url, "consumer.request_token_url")?;
        expand::expand_optional(&mut self.user_authorize_url, "consumer.user_authorize_url")?;
        expand::expand_optional(&mut self.access_token_url, "consumer.access_token_url")?;
        expand::expand_optional(&mut self.callback_url, "consumer.callback_url")?;
        expand::expand_optional(&mut self.access_token, "consumer.access_token")?;
        expand::expand_optional(
            &mut self.access_token_secret,
            "consumer.access_token_secret",
        )?;

        if let Some(path) = &self.private_key_file {
            let expanded =
                expand::expand_env(&path.to_string_lossy(), "consumer.private_key_file")?;
            self.private_key_file = Some(PathBuf::from(expanded));
        }

        Ok(())
    }
}

fn default_signature_method() -> String {
    "PLAINTEXT".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

/// Provider configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Oldest accepted timestamp, in seconds before now.
    pub max_before_now_secs: u64,
    /// Newest accepted timestamp, in seconds after now.
    pub max_after_now_secs: u64,
    /// Lifetime of issued access tokens.
    pub access_token_lifetime_days: u32,
    /// Require `oauth_callback` on request token requests (OAuth 1.0a).
    pub require_callback: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_before_now_secs: 300,
            max_after_now_secs: 300,
            access_token_lifetime_days: 20,
            require_callback: true,
        }
    }
}

impl ProviderConfig {
    /// Validate provider settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a window or lifetime is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_before_now_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.max_before_now_secs cannot be 0".to_owned(),
            ));
        }
        if self.max_after_now_secs == 0 {
            return Err(ConfigError::Validation(
                "provider.max_after_now_secs cannot be 0".to_owned(),
            ));
        }
        if self.access_token_lifetime_days == 0 {
            return Err(ConfigError::Validation(
                "provider.access_token_lifetime_days cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`consumer.consumer_secret`").
        field: String,
        /// Error message (e.g., "${`OAUTH_SECRET`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `oauth1.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    ///
    /// A consumer key override creates the `[consumer]` section when absent.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(consumer_key) = &settings.consumer_key {
            match &mut self.consumer {
                Some(consumer) => consumer.consumer_key.clone_from(consumer_key),
                None => self.consumer = Some(ConsumerConfig::new(consumer_key.clone())),
            }
        }

        let Some(consumer) = &mut self.consumer else {
            return;
        };
        if let Some(consumer_secret) = &settings.consumer_secret {
            consumer.consumer_secret = Some(consumer_secret.clone());
        }
        if let Some(signature_method) = &settings.signature_method {
            consumer.signature_method.clone_from(signature_method);
        }
        if let Some(private_key_file) = &settings.private_key_file {
            consumer.private_key_file = Some(private_key_file.clone());
        }
    }

    /// Get validated consumer configuration.
    ///
    /// Returns the consumer config if the `[consumer]` section is present
    /// and all fields are valid.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_consumer(&self) -> Result<&ConsumerConfig, ConfigError> {
        let consumer = self.consumer.as_ref().ok_or_else(|| {
            ConfigError::Validation("[consumer] section required in config".into())
        })?;
        consumer.validate()?;
        Ok(consumer)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        if let Some(consumer) = &mut config.consumer {
            consumer.expand_env_vars()?;
        }

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(consumer) = &self.consumer {
            consumer.validate()?;
        }
        self.provider.validate()
    }

    /// Resolve the private key path relative to the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(consumer) = &mut self.consumer
            && let Some(key_file) = &consumer.private_key_file
            && key_file.is_relative()
        {
            consumer.private_key_file = Some(config_dir.join(key_file));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.consumer.is_none());
        assert_eq!(config.provider.max_before_now_secs, 300);
        assert_eq!(config.provider.max_after_now_secs, 300);
        assert_eq!(config.provider.access_token_lifetime_days, 20);
        assert!(config.provider.require_callback);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_load_consumer_section() {
        let (_dir, path) = write_config(
            r#"
[consumer]
consumer_key = "key"
consumer_secret = "secret"
signature_method = "HMAC-SHA1"
realm = "photos"
request_token_url = "https://provider.example.com/request_token"
user_authorize_url = "https://provider.example.com/authorize"
access_token_url = "https://provider.example.com/access_token"
callback_url = "oob"
"#,
        );

        let config = Config::load(Some(&path), None).unwrap();
        let consumer = config.require_consumer().unwrap();

        assert_eq!(consumer.consumer_key, "key");
        assert_eq!(consumer.consumer_secret.as_deref(), Some("secret"));
        assert_eq!(consumer.signature_method, "HMAC-SHA1");
        assert_eq!(consumer.realm.as_deref(), Some("photos"));
        assert!(consumer.use_authorization_header);
        assert_eq!(consumer.timeout_secs, 30);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_consumer_defaults() {
        let (_dir, path) = write_config("[consumer]\nconsumer_key = \"key\"\n");

        let config = Config::load(Some(&path), None).unwrap();
        let consumer = config.consumer.unwrap();

        assert_eq!(consumer.signature_method, "PLAINTEXT");
        assert!(consumer.use_authorization_header);
        assert!(!consumer.callback_must_be_confirmed);
        assert!(!consumer.add_body_hashes);
        assert_eq!(consumer.private_key_file, None);
    }

    #[test]
    fn test_private_key_file_resolved_relative_to_config() {
        let (dir, path) = write_config(
            "[consumer]\nconsumer_key = \"key\"\nsignature_method = \"RSA-SHA1\"\nprivate_key_file = \"keys/consumer.pem\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.consumer.unwrap().private_key_file,
            Some(dir.path().join("keys/consumer.pem"))
        );
    }

    #[test]
    fn test_load_provider_section() {
        let (_dir, path) = write_config(
            "[provider]\nmax_before_now_secs = 60\nmax_after_now_secs = 30\naccess_token_lifetime_days = 7\nrequire_callback = false\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.provider.max_before_now_secs, 60);
        assert_eq!(config.provider.max_after_now_secs, 30);
        assert_eq!(config.provider.access_token_lifetime_days, 7);
        assert!(!config.provider.require_callback);
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = Config::load(Some(Path::new("/nonexistent/oauth1.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let (_dir, path) = write_config("[consumer\n");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_consumer_key_rejected() {
        let (_dir, path) = write_config("[consumer]\nconsumer_key = \"\"\n");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: consumer.consumer_key cannot be empty"
        );
    }

    #[test]
    fn test_unknown_signature_method_rejected() {
        let mut consumer = ConsumerConfig::new("key");
        consumer.signature_method = "HMAC-SHA256".to_owned();

        let err = consumer.validate().unwrap_err();
        assert!(err.to_string().contains("consumer.signature_method"));
    }

    #[test]
    fn test_rsa_requires_private_key_file() {
        let mut consumer = ConsumerConfig::new("key");
        consumer.signature_method = "RSA-SHA1".to_owned();

        let err = consumer.validate().unwrap_err();
        assert!(err.to_string().contains("private_key_file"));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let mut consumer = ConsumerConfig::new("key");
        consumer.access_token_url = Some("ftp://provider.example.com/access".to_owned());

        let err = consumer.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: consumer.access_token_url must start with http:// or https://"
        );
    }

    #[test]
    fn test_oob_callback_accepted() {
        let mut consumer = ConsumerConfig::new("key");
        consumer.callback_url = Some("oob".to_owned());

        assert!(consumer.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let provider = ProviderConfig {
            max_after_now_secs: 0,
            ..ProviderConfig::default()
        };

        assert!(provider.validate().is_err());
    }

    #[test]
    fn test_require_consumer_missing_section() {
        let err = Config::default().require_consumer().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: [consumer] section required in config"
        );
    }

    #[test]
    fn test_env_expansion_in_secret() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("OAUTH1_CONFIG_TEST_SECRET", "from-env");
        }
        let (_dir, path) = write_config(
            "[consumer]\nconsumer_key = \"key\"\nconsumer_secret = \"${OAUTH1_CONFIG_TEST_SECRET}\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.consumer.unwrap().consumer_secret.as_deref(),
            Some("from-env")
        );
        unsafe {
            std::env::remove_var("OAUTH1_CONFIG_TEST_SECRET");
        }
    }

    #[test]
    fn test_cli_settings_override() {
        let (_dir, path) = write_config(
            "[consumer]\nconsumer_key = \"key\"\nconsumer_secret = \"secret\"\n",
        );
        let settings = CliSettings {
            consumer_secret: Some("override".to_owned()),
            signature_method: Some("HMAC-SHA1".to_owned()),
            ..CliSettings::default()
        };

        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        let consumer = config.consumer.unwrap();

        assert_eq!(consumer.consumer_key, "key");
        assert_eq!(consumer.consumer_secret.as_deref(), Some("override"));
        assert_eq!(consumer.signature_method, "HMAC-SHA1");
    }

    #[test]
    fn test_cli_consumer_key_creates_section() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            consumer_key: Some("cli-key".to_owned()),
            ..CliSettings::default()
        });

        assert_eq!(config.consumer.unwrap().consumer_key, "cli-key");
    }

    #[test]
    fn test_access_token_pair() {
        let (_dir, path) = write_config(
            "[consumer]\nconsumer_key = \"key\"\naccess_token = \"at\"\naccess_token_secret = \"as\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();
        let consumer = config.require_consumer().unwrap();

        assert_eq!(consumer.access_token.as_deref(), Some("at"));
        assert_eq!(consumer.access_token_secret.as_deref(), Some("as"));
    }

    #[test]
    fn test_access_token_without_secret_rejected() {
        let mut consumer = ConsumerConfig::new("key");
        consumer.access_token = Some("at".to_owned());

        let err = consumer.validate().unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: consumer.access_token and consumer.access_token_secret must be set together"
        );
    }
}
