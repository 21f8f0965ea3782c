// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::DelayDeskConfig;

/// Log levels accepted by `log.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &DelayDeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must be between 1 and 65535"));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation("storage.database_path must not be empty"));
    }

    let level = config.log.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "log.level `{}` must be one of: {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &DelayDeskConfig) -> Vec<String> {
        validate_config(config)
            .err()
            .unwrap_or_default()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&DelayDeskConfig::default()).is_ok());
    }

    #[test]
    fn ipv6_host_is_valid() {
        let mut config = DelayDeskConfig::default();
        config.server.host = "::1".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = DelayDeskConfig::default();
        config.server.host = "bad host!".into();
        config.server.port = 0;
        config.storage.database_path = "  ".into();
        config.log.level = "loud".into();

        let msgs = messages(&config);
        assert_eq!(msgs.len(), 4, "{msgs:?}");
        assert!(msgs.iter().any(|m| m.contains("server.host")));
        assert!(msgs.iter().any(|m| m.contains("server.port")));
        assert!(msgs.iter().any(|m| m.contains("storage.database_path")));
        assert!(msgs.iter().any(|m| m.contains("log.level")));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = DelayDeskConfig::default();
        config.log.level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
