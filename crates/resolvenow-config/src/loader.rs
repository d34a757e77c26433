// SPDX-FileCopyrightText: 2026 ResolveNow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./resolvenow.toml` > `~/.config/resolvenow/resolvenow.toml` >
//! `/etc/resolvenow/resolvenow.toml`, with `RESOLVENOW_` environment overrides.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ResolveNowConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/resolvenow/resolvenow.toml";
pub const LOCAL_CONFIG_PATH: &str = "resolvenow.toml";

/// Sections recognised in `RESOLVENOW_<SECTION>_<KEY>` variable names.
const ENV_SECTIONS: &[&str] = &["server", "auth", "storage", "realtime", "attachments"];

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("resolvenow/resolvenow.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/resolvenow/resolvenow.toml`
/// 3. `~/.config/resolvenow/resolvenow.toml`
/// 4. `./resolvenow.toml`
/// 5. `RESOLVENOW_*` environment variables
pub fn load_config() -> Result<ResolveNowConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ResolveNowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ResolveNowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ResolveNowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ResolveNowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ResolveNowConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `map()` rather than `split("_")` so that underscore-containing keys
/// survive: `RESOLVENOW_STORAGE_DATABASE_PATH` becomes
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("RESOLVENOW_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped variable name to a dotted config key.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("server_port"), "server.port");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(map_env_key("auth_signing_key"), "auth.signing_key");
        assert_eq!(
            map_env_key("attachments_max_file_bytes"),
            "attachments.max_file_bytes"
        );
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
