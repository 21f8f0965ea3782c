// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./delaydesk.toml` > `~/.config/delaydesk/delaydesk.toml`
//! > `/etc/delaydesk/delaydesk.toml`, with `DELAYDESK_` environment overrides and
//! the bare `PORT` / `DATABASE_PATH` variables on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::DelayDeskConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/delaydesk/delaydesk.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "delaydesk.toml";

/// Path of the per-user config file, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("delaydesk").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/delaydesk/delaydesk.toml`
/// 3. `~/.config/delaydesk/delaydesk.toml`
/// 4. `./delaydesk.toml`
/// 5. `DELAYDESK_*` environment variables
/// 6. `PORT` and `DATABASE_PATH`
pub fn load_config() -> Result<DelayDeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<DelayDeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DelayDeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DelayDeskConfig, figment::Error> {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(DelayDeskConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(DelayDeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    with_env(figment.merge(Toml::file(LOCAL_CONFIG_FILE)))
}

fn with_env(figment: Figment) -> Figment {
    figment.merge(prefixed_env()).merge(bare_env())
}

/// `DELAYDESK_*` variables, mapped section-first with `map()`.
///
/// `Env::split("_")` would turn `DELAYDESK_STORAGE_DATABASE_PATH` into
/// `storage.database.path`; only the first underscore separates the section.
/// The key reaches `map()` in the case it was set with, so fold it first.
fn prefixed_env() -> Env {
    Env::prefixed("DELAYDESK_").map(|key| section_key(key.as_str()).into())
}

fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in ["server", "storage", "log"] {
        if let Some(field) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{field}");
        }
    }
    key
}

/// The unprefixed variable names deployments of the dashboard already set.
fn bare_env() -> Env {
    Env::raw()
        .only(&["PORT", "DATABASE_PATH"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("port") {
                "server.port".into()
            } else {
                "storage.database_path".into()
            }
        })
}
