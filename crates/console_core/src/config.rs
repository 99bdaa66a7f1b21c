use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::ChainId;
use url::Url;

use crate::{
    error::ConfigError,
    runner::{ReentryPolicy, RunnerOptions},
};

pub const DEFAULT_API_URL: &str = "https://api.sequence.app";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const CONFIG_FILE_NAME: &str = "console.toml";
const CONFIG_DIR_NAME: &str = "wallet_console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentPreset {
    pub name: &'static str,
    pub wallet_url: &'static str,
    pub project_access_key: &'static str,
}

pub const ENVIRONMENTS: &[EnvironmentPreset] = &[
    EnvironmentPreset {
        name: "production",
        wallet_url: "https://sequence.app",
        project_access_key: "AQAAAAAAAAbvrgpWEC2Aefg5qYStQmwjBpA",
    },
    EnvironmentPreset {
        name: "development",
        wallet_url: "https://dev.sequence.app",
        project_access_key: "AQAAAAAAAAVCXiQ9f_57R44MjorZ4SmGdhA",
    },
    EnvironmentPreset {
        name: "local",
        wallet_url: "http://localhost:3333",
        project_access_key: "AQAAAAAAAAVCXiQ9f_57R44MjorZ4SmGdhA",
    },
    EnvironmentPreset {
        name: "custom",
        wallet_url: "",
        project_access_key: "",
    },
];

pub fn find_environment(name: &str) -> Option<&'static EnvironmentPreset> {
    ENVIRONMENTS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
}

/// One source of settings. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub env: Option<String>,
    pub wallet_app_url: Option<String>,
    pub project_access_key: Option<String>,
    pub api_url: Option<String>,
    pub default_chain_id: Option<u64>,
    pub show_prohibited_actions: Option<bool>,
    pub action_timeout_secs: Option<u64>,
    pub reentry_policy: Option<ReentryPolicy>,
}

impl ConfigLayer {
    /// Fields set on `self` win over `lower`.
    pub fn over(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            env: self.env.or(lower.env),
            wallet_app_url: self.wallet_app_url.or(lower.wallet_app_url),
            project_access_key: self.project_access_key.or(lower.project_access_key),
            api_url: self.api_url.or(lower.api_url),
            default_chain_id: self.default_chain_id.or(lower.default_chain_id),
            show_prohibited_actions: self
                .show_prohibited_actions
                .or(lower.show_prohibited_actions),
            action_timeout_secs: self.action_timeout_secs.or(lower.action_timeout_secs),
            reentry_policy: self.reentry_policy.or(lower.reentry_policy),
        }
    }

    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut layer = ConfigLayer {
            env: lookup("APP__ENV"),
            wallet_app_url: lookup("APP__WALLET_APP_URL"),
            project_access_key: lookup("APP__PROJECT_ACCESS_KEY"),
            api_url: lookup("APP__API_URL"),
            ..ConfigLayer::default()
        };

        if let Some(raw) = lookup("APP__DEFAULT_CHAIN_ID") {
            layer.default_chain_id = Some(parse_value("APP__DEFAULT_CHAIN_ID", &raw)?);
        }
        if let Some(raw) = lookup("APP__SHOW_PROHIBITED_ACTIONS") {
            layer.show_prohibited_actions = Some(parse_flag("APP__SHOW_PROHIBITED_ACTIONS", &raw)?);
        }
        if let Some(raw) = lookup("APP__ACTION_TIMEOUT_SECS") {
            layer.action_timeout_secs = Some(parse_value("APP__ACTION_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("APP__REENTRY_POLICY") {
            let policy = raw
                .parse::<ReentryPolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "APP__REENTRY_POLICY".to_string(),
                    value: raw.clone(),
                    reason,
                })?;
            layer.reentry_policy = Some(policy);
        }

        Ok(layer)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: err.to_string(),
        })
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Resolved settings; built once at start-up and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub environment: String,
    pub wallet_app_url: String,
    pub project_access_key: String,
    pub api_url: String,
    pub default_chain_id: ChainId,
    pub show_prohibited_actions: bool,
    pub runner: RunnerOptions,
    /// Wallet URL or access key differ from the selected preset.
    pub is_custom: bool,
}

impl ConsoleConfig {
    pub fn resolve(layer: ConfigLayer) -> Result<Self, ConfigError> {
        let env_name = layer
            .env
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let preset = find_environment(&env_name)
            .ok_or_else(|| ConfigError::UnknownEnvironment(env_name.clone()))?;

        let wallet_app_url = layer
            .wallet_app_url
            .unwrap_or_else(|| preset.wallet_url.to_string());
        let project_access_key = layer
            .project_access_key
            .unwrap_or_else(|| preset.project_access_key.to_string());
        let api_url = layer
            .api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !wallet_app_url.is_empty() {
            validate_url("wallet_app_url", &wallet_app_url)?;
        }
        validate_url("api_url", &api_url)?;

        let is_custom = wallet_app_url != preset.wallet_url
            || project_access_key != preset.project_access_key;

        Ok(Self {
            environment: preset.name.to_string(),
            wallet_app_url,
            project_access_key,
            api_url,
            default_chain_id: layer
                .default_chain_id
                .map(ChainId)
                .unwrap_or(ChainId::MAINNET),
            show_prohibited_actions: layer.show_prohibited_actions.unwrap_or(false),
            runner: RunnerOptions {
                reentry: layer.reentry_policy.unwrap_or_default(),
                timeout: layer
                    .action_timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            },
            is_custom,
        })
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let preset = &ENVIRONMENTS[0];
        Self {
            environment: preset.name.to_string(),
            wallet_app_url: preset.wallet_url.to_string(),
            project_access_key: preset.project_access_key.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            default_chain_id: ChainId::MAINNET,
            show_prohibited_actions: false,
            runner: RunnerOptions::default(),
            is_custom: false,
        }
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|source| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            source,
        })
}

pub fn read_config_file(path: &Path) -> Result<ConfigLayer, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `./console.toml`, then `<config dir>/wallet_console/console.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Resolves the configuration from, lowest to highest precedence: preset, file,
/// environment variables, and the caller's `overrides` (typically CLI flags).
pub fn load_config(
    explicit_path: Option<&Path>,
    overrides: ConfigLayer,
) -> Result<ConsoleConfig, ConfigError> {
    let file_layer = match explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
    {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading console config file");
            read_config_file(&path)?
        }
        None => ConfigLayer::default(),
    };
    let env_layer = ConfigLayer::from_env()?;

    let config = ConsoleConfig::resolve(overrides.over(env_layer).over(file_layer))?;
    tracing::info!(
        environment = %config.environment,
        wallet_app_url = %config.wallet_app_url,
        custom = config.is_custom,
        "console config resolved"
    );
    Ok(config)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
