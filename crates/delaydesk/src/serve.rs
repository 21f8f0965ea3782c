// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `delaydesk serve` command implementation.
//!
//! Opens the SQLite store, wires the delay service into the HTTP router, and
//! serves until SIGINT/SIGTERM. The store is checkpointed on the way out.

use std::sync::Arc;

use delaydesk_config::DelayDeskConfig;
use delaydesk_core::{DelayError, DelayStore};
use delaydesk_gateway::start_server;
use delaydesk_service::DelayService;
use delaydesk_storage::SqliteStore;
use tracing::{error, info};

use crate::shutdown;

/// Runs the `delaydesk serve` command.
pub async fn run_serve(config: DelayDeskConfig) -> Result<(), DelayError> {
    init_tracing(&config.log.level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting delaydesk serve"
    );

    let store = Arc::new(SqliteStore::open(&config.storage).await?);
    let service = DelayService::new(store.clone());

    let cancel = shutdown::install_signal_handler();
    let served = start_server(&config.server, service, cancel.clone()).await;
    // Stops the signal task if the server exited on its own.
    cancel.cancel();

    if let Err(e) = store.close().await {
        error!(error = %e, "failed to checkpoint database on shutdown");
    }

    served?;
    info!("delaydesk serve shutdown complete");
    Ok(())
}

/// Default filter directives for a configured level.
///
/// `RUST_LOG` overrides these entirely.
pub fn default_directives(log_level: &str) -> String {
    format!("delaydesk={log_level},tower_http={log_level},warn")
}

/// Installs the global tracing subscriber.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_workspace_and_http_traces() {
        assert_eq!(
            default_directives("debug"),
            "delaydesk=debug,tower_http=debug,warn"
        );
    }
}
