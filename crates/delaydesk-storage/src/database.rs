// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. `Database` is the single writer; query modules accept `&Database`
//! and go through [`Database::connection`]. Do NOT open additional
//! connections for writes.

use std::path::Path;

use delaydesk_core::DelayError;
use tracing::{debug, info};

use crate::migrations;

/// Path value that selects a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs, and
    /// runs pending migrations. `:memory:` opens a private in-memory database.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, DelayError> {
        if path == IN_MEMORY {
            return Self::open_in_memory().await;
        }

        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DelayError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| DelayError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        info!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, DelayError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| DelayError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        debug!("in-memory database opened");
        Ok(db)
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), DelayError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoints and closes the connection.
    pub async fn close(self) -> Result<(), DelayError> {
        self.checkpoint().await?;
        self.conn
            .close()
            .await
            .map_err(|e| DelayError::Storage {
                source: e.to_string().into(),
            })
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), DelayError> {
        self.conn
            .call(move |conn| {
                conn.execute_batch("PRAGMA busy_timeout = 5000; PRAGMA synchronous = NORMAL;")
                    .map_err(storage_err)?;
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")
                        .map_err(storage_err)?;
                }
                migrations::run_migrations(conn)
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => DelayError::Storage {
                    source: other.to_string().into(),
                },
            })
    }
}

fn storage_err(e: rusqlite::Error) -> DelayError {
    DelayError::Storage {
        source: Box::new(e),
    }
}

/// Maps a tokio-rusqlite call failure into the storage error variant.
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> DelayError {
    match err {
        tokio_rusqlite::Error::Error(e) => storage_err(e),
        other => DelayError::Storage {
            source: other.to_string().into(),
        },
    }
}
