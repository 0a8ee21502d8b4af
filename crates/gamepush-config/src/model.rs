// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the gamepush notifier.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level gamepush configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GamepushConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Promotion cache backend.
    #[serde(default)]
    pub cache: CacheConfig,

    /// WeChat official account credentials.
    #[serde(default)]
    pub wechat: WechatConfig,

    /// OneBot-compatible QQ relay settings.
    #[serde(default)]
    pub qq: QqConfig,

    /// Storefront catalog endpoint.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Cron cadence for the background jobs.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Retry reconciler behavior.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Management HTTP surface.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Offset from UTC, in hours, that cron expressions are evaluated in.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_service_name() -> String {
    "gamepush".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_utc_offset_hours() -> i32 {
    8
}

/// SQLite storage configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("gamepush").join("gamepush.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("gamepush.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Which key-value store backs the promotion cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Tables in the main SQLite database; survives restarts.
    #[default]
    Sqlite,
    /// Process memory; lost on restart.
    Memory,
}

/// Promotion cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
}

/// WeChat official account configuration.
///
/// Empty credentials leave the channel unconfigured: sends fail fast.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WechatConfig {
    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub app_secret: String,

    /// Server token shared with the official account platform, used to
    /// verify callback signatures. Empty disables the callback routes.
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_wechat_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WechatConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            token: String::new(),
            api_base: default_wechat_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_wechat_api_base() -> String {
    "https://api.weixin.qq.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// QQ bot relay (OneBot HTTP API) configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QqConfig {
    /// Base URL of the relay, e.g. `http://localhost:5700`. Empty disables QQ.
    #[serde(default)]
    pub api_url: String,

    /// Optional bearer token for the relay.
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for QqConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Storefront catalog configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Free-games promotions JSON endpoint.
    #[serde(default = "default_catalog_api_url")]
    pub api_url: String,

    /// Store base URL used to build product page links.
    #[serde(default = "default_store_url")]
    pub store_url: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_catalog_api_url(),
            store_url: default_store_url(),
            locale: default_locale(),
            country: default_country(),
            timeout_secs: default_catalog_timeout_secs(),
        }
    }
}

fn default_catalog_api_url() -> String {
    "https://store-site-backend-static.ak.epicgames.com/freeGamesPromotions".to_string()
}

fn default_store_url() -> String {
    "https://store.epicgames.com/zh-CN".to_string()
}

fn default_locale() -> String {
    "zh-CN".to_string()
}

fn default_country() -> String {
    "CN".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    30
}

/// Cron cadence for background jobs (5-field expressions).
///
/// Day-of-week is numeric: 0 = Sunday, 4 = Thursday, 5 = Friday.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Run the background scheduler at all.
    #[serde(default = "default_schedule_enabled")]
    pub enabled: bool,

    /// Catalog refresh, shortly after the weekly storefront rotation.
    #[serde(default = "default_refresh_cron")]
    pub refresh: String,

    /// Dispatch of the current window.
    #[serde(default = "default_dispatch_current_cron")]
    pub dispatch_current: String,

    /// Dispatch of the next-week preview.
    #[serde(default = "default_dispatch_next_cron")]
    pub dispatch_next: String,

    /// Retry of failed deliveries.
    #[serde(default = "default_retry_cron")]
    pub retry: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_schedule_enabled(),
            refresh: default_refresh_cron(),
            dispatch_current: default_dispatch_current_cron(),
            dispatch_next: default_dispatch_next_cron(),
            retry: default_retry_cron(),
        }
    }
}

fn default_schedule_enabled() -> bool {
    true
}

fn default_refresh_cron() -> String {
    "5 23 * * 4".to_string()
}

fn default_dispatch_current_cron() -> String {
    "0 9 * * 5".to_string()
}

fn default_dispatch_next_cron() -> String {
    "30 9 * * 5".to_string()
}

fn default_retry_cron() -> String {
    "0 10-22 * * *".to_string()
}

/// Retry reconciler configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Also mark the pair notified in the cache when a retry recovers a row.
    ///
    /// Off by default, so a later dispatch pass still re-sends to a
    /// subscriber whose first attempt failed and was later recovered.
    #[serde(default)]
    pub mark_notified_on_recovery: bool,
}

/// Management HTTP surface configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}
