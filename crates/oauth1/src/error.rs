//! CLI error types.

use oauth1_config::ConfigError;
use oauth1_consumer::ConsumerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Consumer(#[from] ConsumerError),

    #[error("{0}")]
    Core(#[from] oauth1_core::Error),

    #[error("{0}")]
    Validation(String),
}
