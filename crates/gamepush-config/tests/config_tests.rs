// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the gamepush configuration system.

use gamepush_config::diagnostic::ConfigError;
use gamepush_config::model::{CacheBackend, GamepushConfig};
use gamepush_config::{load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "gamepush-test"
log_level = "debug"
utc_offset_hours = 0

[storage]
database_path = "/tmp/gamepush.db"
wal_mode = false

[cache]
backend = "memory"

[wechat]
app_id = "wx123"
app_secret = "s3cret"
token = "callback-token"

[qq]
api_url = "http://127.0.0.1:5700"
access_token = "relay-token"
timeout_secs = 3

[catalog]
locale = "en-US"
country = "US"
store_url = "https://store.epicgames.com/en-US"

[schedule]
enabled = false
retry = "0 */2 * * *"

[retry]
mark_notified_on_recovery = true

[gateway]
port = 9000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "gamepush-test");
    assert_eq!(config.service.utc_offset_hours, 0);
    assert_eq!(config.storage.database_path, "/tmp/gamepush.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.wechat.app_id, "wx123");
    assert_eq!(config.wechat.api_base, "https://api.weixin.qq.com");
    assert_eq!(config.qq.access_token.as_deref(), Some("relay-token"));
    assert_eq!(config.qq.timeout_secs, 3);
    assert_eq!(config.catalog.locale, "en-US");
    assert!(!config.schedule.enabled);
    assert_eq!(config.schedule.retry, "0 */2 * * *");
    assert_eq!(config.schedule.refresh, "5 23 * * 4");
    assert!(config.retry.mark_notified_on_recovery);
    assert_eq!(config.gateway.port, 9000);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config, GamepushConfig::default());
    assert_eq!(config.service.utc_offset_hours, 8);
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert!(config.wechat.app_id.is_empty());
    assert!(config.qq.api_url.is_empty());
    assert!(!config.retry.mark_notified_on_recovery);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let toml = r#"
[wechat]
app_secert = "oops"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key, suggestion, ..
            } => Some((key.clone(), suggestion.clone())),
            _ => None,
        })
        .expect("expected an unknown key diagnostic");
    assert_eq!(unknown.0, "app_secert");
    assert_eq!(unknown.1.as_deref(), Some("app_secret"));
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[redis]\nurl = \"redis://localhost\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "redis"))
    );
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port")))
    );
}

#[test]
fn unknown_cache_backend_is_rejected() {
    assert!(load_and_validate_str("[cache]\nbackend = \"redis\"\n").is_err());
}

#[test]
fn validation_runs_after_load() {
    let toml = r#"
[schedule]
refresh = "not a cron"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("schedule.refresh"))
    ));
}

#[test]
fn diagnostics_render_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let errors = load_and_validate_str("[qq]\napi_ulr = \"x\"\n").unwrap_err();
    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &errors[0] as &dyn Diagnostic)
        .unwrap();
    assert!(buf.contains("api_ulr"));
    assert!(buf.contains("api_url"));
}

#[test]
fn redacted_toml_masks_credentials_and_reloads() {
    let config = load_and_validate_str(
        r#"
[wechat]
app_id = "wx123"
app_secret = "s3cret"
token = "callback-token"

[qq]
api_url = "http://127.0.0.1:5700"
access_token = "relay-token"
"#,
    )
    .unwrap();

    let rendered = gamepush_config::to_redacted_toml(&config).unwrap();
    assert!(!rendered.contains("s3cret"));
    assert!(!rendered.contains("relay-token"));
    assert!(!rendered.contains("callback-token"));
    assert!(rendered.contains("wx123"));

    let reloaded = load_config_from_str(&rendered).unwrap();
    assert_eq!(reloaded.schedule, config.schedule);
    assert_eq!(reloaded.wechat.app_id, "wx123");
}
