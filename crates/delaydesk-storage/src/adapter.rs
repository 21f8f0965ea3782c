// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the DelayStore trait.

use async_trait::async_trait;
use tracing::debug;

use delaydesk_config::model::StorageConfig;
use delaydesk_core::{
    DelayError, DelayFilter, DelayId, DelayReport, DelaySort, DelayStatus, DelayStore,
    NeighborhoodTotals, NewDelayReport,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed delay store.
///
/// Wraps a [`Database`] handle and delegates all operations to the typed
/// query module.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Opens the database named by `config`, creating and migrating it as needed.
    pub async fn open(config: &StorageConfig) -> Result<Self, DelayError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    /// Opens a private in-memory store.
    pub async fn open_in_memory() -> Result<Self, DelayError> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }
}

#[async_trait]
impl DelayStore for SqliteStore {
    async fn insert(&self, report: NewDelayReport) -> Result<DelayReport, DelayError> {
        queries::delays::insert_report(&self.db, report).await
    }

    async fn find_by_id(&self, id: &DelayId) -> Result<Option<DelayReport>, DelayError> {
        queries::delays::get_report(&self.db, id).await
    }

    async fn find_many(
        &self,
        filter: DelayFilter,
        sort: DelaySort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DelayReport>, DelayError> {
        queries::delays::list_reports(&self.db, filter, sort, offset, limit).await
    }

    async fn count(&self, filter: DelayFilter) -> Result<u64, DelayError> {
        queries::delays::count_reports(&self.db, filter).await
    }

    async fn update_status(
        &self,
        id: &DelayId,
        status: DelayStatus,
    ) -> Result<Option<DelayReport>, DelayError> {
        queries::delays::update_status(&self.db, id, status).await
    }

    async fn delete_by_id(&self, id: &DelayId) -> Result<Option<DelayReport>, DelayError> {
        queries::delays::delete_report(&self.db, id).await
    }

    async fn group_by_neighborhood(
        &self,
        filter: DelayFilter,
    ) -> Result<Vec<NeighborhoodTotals>, DelayError> {
        queries::delays::group_by_neighborhood(&self.db, filter).await
    }

    async fn clear(&self) -> Result<u64, DelayError> {
        queries::delays::delete_all(&self.db).await
    }

    async fn health_check(&self) -> Result<(), DelayError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn close(&self) -> Result<(), DelayError> {
        self.db.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
