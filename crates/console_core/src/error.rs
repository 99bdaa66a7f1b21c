use std::path::PathBuf;

use shared::error::WalletError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("unknown environment '{0}' (expected production, development, local or custom)")]
    UnknownEnvironment(String),
    #[error("invalid url for {field}: '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("action '{0}' is already registered")]
    DuplicateAction(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingError {
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("action '{name}' is disabled: {reason}")]
    ActionDisabled { name: String, reason: String },
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount '{0}' is negative")]
    Negative(String),
    #[error("invalid amount '{value}': {reason}")]
    Invalid { value: String, reason: String },
}
