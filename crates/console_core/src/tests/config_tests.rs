use super::*;

use std::{collections::HashMap, io::Write};

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn empty_layer_resolves_to_production_preset() {
    let config = ConsoleConfig::resolve(ConfigLayer::default()).expect("resolve");

    assert_eq!(config, ConsoleConfig::default());
    assert_eq!(config.wallet_app_url, "https://sequence.app");
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.default_chain_id, ChainId::MAINNET);
    assert!(!config.is_custom);
    assert_eq!(config.runner.reentry, ReentryPolicy::Reject);
    assert_eq!(config.runner.timeout, None);
}

#[test]
fn selecting_a_preset_is_not_custom() {
    let config = ConsoleConfig::resolve(ConfigLayer {
        env: Some("Local".to_string()),
        ..ConfigLayer::default()
    })
    .expect("resolve");

    assert_eq!(config.environment, "local");
    assert_eq!(config.wallet_app_url, "http://localhost:3333");
    assert!(!config.is_custom);
}

#[test]
fn overriding_wallet_url_marks_config_custom() {
    let config = ConsoleConfig::resolve(ConfigLayer {
        env: Some("development".to_string()),
        wallet_app_url: Some("https://alpha.sequence.app".to_string()),
        ..ConfigLayer::default()
    })
    .expect("resolve");

    assert!(config.is_custom);
    assert_eq!(
        config.project_access_key,
        "AQAAAAAAAAVCXiQ9f_57R44MjorZ4SmGdhA"
    );
}

#[test]
fn unknown_environment_is_an_error() {
    let err = ConsoleConfig::resolve(ConfigLayer {
        env: Some("staging".to_string()),
        ..ConfigLayer::default()
    })
    .expect_err("unknown env");

    assert!(matches!(err, ConfigError::UnknownEnvironment(name) if name == "staging"));
}

#[test]
fn malformed_wallet_url_is_rejected() {
    let err = ConsoleConfig::resolve(ConfigLayer {
        wallet_app_url: Some("not a url".to_string()),
        ..ConfigLayer::default()
    })
    .expect_err("bad url");

    assert!(matches!(
        err,
        ConfigError::InvalidUrl {
            field: "wallet_app_url",
            ..
        }
    ));
}

#[test]
fn custom_environment_accepts_empty_wallet_url() {
    let config = ConsoleConfig::resolve(ConfigLayer {
        env: Some("custom".to_string()),
        ..ConfigLayer::default()
    })
    .expect("resolve");

    assert_eq!(config.wallet_app_url, "");
    assert!(!config.is_custom);
}

#[test]
fn zero_timeout_disables_the_timeout() {
    let config = ConsoleConfig::resolve(ConfigLayer {
        action_timeout_secs: Some(0),
        ..ConfigLayer::default()
    })
    .expect("resolve");
    assert_eq!(config.runner.timeout, None);

    let config = ConsoleConfig::resolve(ConfigLayer {
        action_timeout_secs: Some(30),
        ..ConfigLayer::default()
    })
    .expect("resolve");
    assert_eq!(config.runner.timeout, Some(Duration::from_secs(30)));
}

#[test]
fn env_layer_parses_typed_values() {
    let layer = ConfigLayer::from_env_with(lookup_from(&[
        ("APP__ENV", "development"),
        ("APP__DEFAULT_CHAIN_ID", "137"),
        ("APP__SHOW_PROHIBITED_ACTIONS", "yes"),
        ("APP__ACTION_TIMEOUT_SECS", "15"),
        ("APP__REENTRY_POLICY", "supersede"),
    ]))
    .expect("env layer");

    assert_eq!(layer.env.as_deref(), Some("development"));
    assert_eq!(layer.default_chain_id, Some(137));
    assert_eq!(layer.show_prohibited_actions, Some(true));
    assert_eq!(layer.action_timeout_secs, Some(15));
    assert_eq!(layer.reentry_policy, Some(ReentryPolicy::Supersede));
}

#[test]
fn env_layer_reports_bad_numbers() {
    let err = ConfigLayer::from_env_with(lookup_from(&[("APP__DEFAULT_CHAIN_ID", "polygon")]))
        .expect_err("bad chain id");

    assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "APP__DEFAULT_CHAIN_ID"));
}

#[test]
fn higher_layer_wins_and_gaps_fall_through() {
    let cli = ConfigLayer {
        default_chain_id: Some(10),
        ..ConfigLayer::default()
    };
    let env = ConfigLayer {
        env: Some("local".to_string()),
        default_chain_id: Some(137),
        ..ConfigLayer::default()
    };
    let file = ConfigLayer {
        env: Some("development".to_string()),
        show_prohibited_actions: Some(true),
        ..ConfigLayer::default()
    };

    let merged = cli.over(env).over(file);

    assert_eq!(merged.env.as_deref(), Some("local"));
    assert_eq!(merged.default_chain_id, Some(10));
    assert_eq!(merged.show_prohibited_actions, Some(true));
}

#[test]
fn reads_toml_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
env = "development"
default_chain_id = 137
show_prohibited_actions = true
reentry_policy = "supersede"
"#
    )
    .expect("write config");

    let layer = read_config_file(file.path()).expect("read config");
    let config = ConsoleConfig::resolve(layer).expect("resolve");

    assert_eq!(config.environment, "development");
    assert_eq!(config.default_chain_id, ChainId::POLYGON);
    assert!(config.show_prohibited_actions);
    assert_eq!(config.runner.reentry, ReentryPolicy::Supersede);
}

#[test]
fn unknown_keys_in_config_file_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "wallet_url = \"https://sequence.app\"").expect("write config");

    let err = read_config_file(file.path()).expect_err("unknown key");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_config_file(&dir.path().join("absent.toml")).expect_err("missing");
    assert!(matches!(err, ConfigError::Read { .. }));
}
