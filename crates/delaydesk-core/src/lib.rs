// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for DelayDesk.
//!
//! Holds the delay report data model, the error taxonomy shared by every
//! layer, and the [`DelayStore`] trait that storage backends implement.

pub mod error;
pub mod parse;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{DelayError, FieldViolation, ViolationKind};
pub use traits::DelayStore;
pub use types::{
    CreateDelayRequest, DelayFilter, DelayId, DelayReport, DelaySort, DelayStatus,
    NeighborhoodSummary, NeighborhoodTotals, NewDelayReport, Page, Pagination, StatusFilter,
};
