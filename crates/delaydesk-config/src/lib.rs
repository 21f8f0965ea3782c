// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for DelayDesk.
//!
//! TOML files layered with environment overrides, strict key checking, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use delaydesk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on port {}", config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, SourceFile, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::DelayDeskConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<DelayDeskConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &collect_sources())),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<DelayDeskConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = [SourceFile {
                path: "<inline>".to_string(),
                content: toml_content.to_string(),
            }];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Reads the config files that exist so diagnostics can point into them.
fn collect_sources() -> Vec<SourceFile> {
    let local = std::env::current_dir()
        .map(|d| d.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    [Some(local), loader::user_config_path(), Some(loader::SYSTEM_CONFIG_PATH.into())]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path).ok().map(|content| SourceFile {
                path: path.display().to_string(),
                content,
            })
        })
        .collect()
}
