//! CLI command implementations.

pub(crate) mod generate_tokens;
pub(crate) mod sign;

use std::path::{Path, PathBuf};

use clap::Args;
use oauth1_config::{CliSettings, Config};
use tracing::info;

pub(crate) use generate_tokens::GenerateTokensArgs;
pub(crate) use sign::SignArgs;

use crate::error::CliError;

/// Consumer credential overrides shared by all commands.
#[derive(Args, Debug, Default)]
pub(crate) struct ConsumerArgs {
    /// OAuth consumer key (default: from config).
    #[arg(long, env = "OAUTH1_CONSUMER_KEY")]
    consumer_key: Option<String>,

    /// Consumer secret for HMAC-SHA1 and PLAINTEXT.
    #[arg(long, env = "OAUTH1_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    /// PLAINTEXT, HMAC-SHA1 or RSA-SHA1.
    #[arg(short = 's', long)]
    signature_method: Option<String>,

    /// Path to the RSA private key (PEM) for RSA-SHA1.
    #[arg(short = 'k', long = "private-key")]
    private_key: Option<PathBuf>,
}

impl ConsumerArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            signature_method: self.signature_method.clone(),
            private_key_file: self.private_key.clone(),
        }
    }

    /// Load the config with these overrides applied.
    pub(crate) fn load_config(&self, config_path: Option<&Path>) -> Result<Config, CliError> {
        let config = Config::load(config_path, Some(&self.cli_settings()))?;
        match &config.config_path {
            Some(path) => info!(path = %path.display(), "loaded configuration"),
            None => info!("no configuration file found"),
        }
        Ok(config)
    }
}

/// Parse a `key=value` argument.
pub(crate) fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got \"{arg}\""))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in \"{arg}\""));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("status=hello world"),
            Ok(("status".to_owned(), "hello world".to_owned()))
        );
    }

    #[test]
    fn test_parse_key_value_keeps_later_equals() {
        assert_eq!(
            parse_key_value("filter=a=b"),
            Ok(("filter".to_owned(), "a=b".to_owned()))
        );
    }

    #[test]
    fn test_parse_key_value_allows_empty_value() {
        assert_eq!(
            parse_key_value("flag="),
            Ok(("flag".to_owned(), String::new()))
        );
    }

    #[test]
    fn test_parse_key_value_rejects_missing_separator() {
        assert_eq!(
            parse_key_value("status"),
            Err("expected key=value, got \"status\"".to_owned())
        );
    }

    #[test]
    fn test_parse_key_value_rejects_empty_name() {
        assert_eq!(
            parse_key_value("=x"),
            Err("empty parameter name in \"=x\"".to_owned())
        );
    }

    #[test]
    fn test_cli_settings_carry_overrides() {
        let args = ConsumerArgs {
            consumer_key: Some("cli-key".to_owned()),
            signature_method: Some("HMAC-SHA1".to_owned()),
            ..ConsumerArgs::default()
        };

        let settings = args.cli_settings();

        assert_eq!(settings.consumer_key.as_deref(), Some("cli-key"));
        assert_eq!(settings.signature_method.as_deref(), Some("HMAC-SHA1"));
        assert_eq!(settings.consumer_secret, None);
        assert_eq!(settings.private_key_file, None);
    }
}
