// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the services, and the HTTP surface.
//!
//! Wire names are camelCase so the dashboard client can consume records as-is.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a delay report.
///
/// Assigned by the store on insert from a random UUID, so an id is never
/// handed out twice even after the record it named is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelayId(pub String);

impl DelayId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DelayId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a delay report. The only transition is Active -> Resolved.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DelayStatus {
    #[default]
    Active,
    Resolved,
}

/// Status selector accepted by the list operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Resolved,
    All,
}

impl StatusFilter {
    /// The store-level filter this selector corresponds to.
    pub fn to_filter(self) -> DelayFilter {
        match self {
            Self::Active => DelayFilter::status(DelayStatus::Active),
            Self::Resolved => DelayFilter::status(DelayStatus::Resolved),
            Self::All => DelayFilter::all(),
        }
    }
}

/// A persisted delay report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayReport {
    #[serde(rename = "_id")]
    pub id: DelayId,
    pub route_number: String,
    pub neighborhood: String,
    pub delay_minutes: u32,
    pub reason: String,
    pub bus_id: String,
    pub reported_at: DateTime<Utc>,
    pub status: DelayStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated report ready to be inserted. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDelayReport {
    pub route_number: String,
    pub neighborhood: String,
    pub delay_minutes: u32,
    pub reason: String,
    pub bus_id: String,
    pub reported_at: DateTime<Utc>,
    pub status: DelayStatus,
}

/// Raw create payload as sent by a client.
///
/// Every field is optional and kept as raw JSON so that missing or mistyped
/// fields surface as validation violations instead of deserialization
/// failures. Clients send `routeNumber` as `42` as often as `"42"`, and
/// `delayMinutes` both as a number and as a string.
/// Unknown fields (including any client-supplied `status`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDelayRequest {
    #[serde(default)]
    pub route_number: Option<serde_json::Value>,
    #[serde(default)]
    pub neighborhood: Option<serde_json::Value>,
    #[serde(default)]
    pub delay_minutes: Option<serde_json::Value>,
    #[serde(default)]
    pub reason: Option<serde_json::Value>,
    #[serde(default)]
    pub bus_id: Option<serde_json::Value>,
}

/// Store-level filter. `status: None` matches every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelayFilter {
    pub status: Option<DelayStatus>,
}

impl DelayFilter {
    pub const fn all() -> Self {
        Self { status: None }
    }

    pub const fn status(status: DelayStatus) -> Self {
        Self {
            status: Some(status),
        }
    }
}

/// Sort orders supported by [`crate::DelayStore::find_many`].
///
/// Records sharing a `reported_at` keep their insertion order in the same direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DelaySort {
    #[default]
    ReportedAtDesc,
    ReportedAtAsc,
}

/// Raw per-neighborhood totals produced by the store's group stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborhoodTotals {
    pub neighborhood: String,
    pub count: u64,
    pub total_delay_minutes: u64,
}

/// One row of the aggregate-by-neighborhood response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodSummary {
    pub neighborhood: String,
    pub count: u64,
    pub total_delay_minutes: u64,
    pub avg_delay_minutes: f64,
}

/// Pagination metadata returned alongside a page of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Computes page metadata. `page` and `page_size` must be at least 1.
    pub fn new(page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size);
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: page_size,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// A page of results plus its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Current time truncated to the millisecond precision the store persists.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
