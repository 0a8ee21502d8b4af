// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gamepush.toml` > `~/.config/gamepush/gamepush.toml`
//! > `/etc/gamepush/gamepush.toml` with environment variable overrides via the
//! `GAMEPUSH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GamepushConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/gamepush/gamepush.toml";
pub(crate) const LOCAL_CONFIG: &str = "gamepush.toml";

/// Config sections addressable from the environment.
const ENV_SECTIONS: &[&str] = &[
    "service", "storage", "cache", "wechat", "qq", "catalog", "schedule", "retry", "gateway",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gamepush/gamepush.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gamepush/gamepush.toml` (system-wide)
/// 3. `~/.config/gamepush/gamepush.toml` (user XDG config)
/// 4. `./gamepush.toml` (local directory)
/// 5. `GAMEPUSH_*` environment variables
pub fn load_config() -> Result<GamepushConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<GamepushConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GamepushConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GamepushConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GamepushConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(GamepushConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Map an env key (prefix stripped, lowercased) to a dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `wechat_app_secret` maps to `wechat.app_secret` rather than `wechat.app.secret`.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

/// `Env` hands over keys in their original case with only the prefix removed.
fn env_provider() -> Env {
    Env::prefixed("GAMEPUSH_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}
