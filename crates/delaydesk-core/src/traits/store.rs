// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store trait for delay report persistence backends.

use async_trait::async_trait;

use crate::error::DelayError;
use crate::types::{
    DelayFilter, DelayId, DelayReport, DelaySort, DelayStatus, NeighborhoodTotals,
    NewDelayReport,
};

/// Durable persistence for delay reports.
///
/// Services receive an explicitly constructed handle (`Arc<dyn DelayStore>`)
/// rather than reaching for a process-wide connection. Every method is a
/// single atomic statement against the backend; concurrent writes to the
/// same id resolve as last-write-wins.
#[async_trait]
pub trait DelayStore: Send + Sync + 'static {
    /// Persists a validated report, assigning its id and timestamps.
    async fn insert(&self, report: NewDelayReport) -> Result<DelayReport, DelayError>;

    /// Looks a report up by id.
    async fn find_by_id(&self, id: &DelayId) -> Result<Option<DelayReport>, DelayError>;

    /// Returns up to `limit` reports matching `filter`, skipping `offset`, in `sort` order.
    async fn find_many(
        &self,
        filter: DelayFilter,
        sort: DelaySort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DelayReport>, DelayError>;

    /// Counts reports matching `filter`.
    async fn count(&self, filter: DelayFilter) -> Result<u64, DelayError>;

    /// Sets the status of a report and bumps `updated_at`.
    ///
    /// Returns the updated record, or `None` if no record has that id.
    async fn update_status(
        &self,
        id: &DelayId,
        status: DelayStatus,
    ) -> Result<Option<DelayReport>, DelayError>;

    /// Deletes a report, returning its last state, or `None` if it did not exist.
    async fn delete_by_id(&self, id: &DelayId) -> Result<Option<DelayReport>, DelayError>;

    /// Groups matching reports by neighborhood with count and delay sum.
    ///
    /// Groups are emitted in the order their first member was inserted.
    async fn group_by_neighborhood(
        &self,
        filter: DelayFilter,
    ) -> Result<Vec<NeighborhoodTotals>, DelayError>;

    /// Removes every report. Returns the number of deleted rows.
    async fn clear(&self) -> Result<u64, DelayError>;

    /// Verifies the backend answers queries.
    async fn health_check(&self) -> Result<(), DelayError>;

    /// Flushes pending state before the process exits.
    async fn close(&self) -> Result<(), DelayError>;
}
