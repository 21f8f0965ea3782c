// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business operations over the delay store.
//!
//! [`DelayService`] owns an injected [`DelayStore`] handle and exposes the
//! read side (paginated listing, per-neighborhood aggregation) and the write
//! side (create, resolve, delete). Validation runs before any store call.

pub mod mutation;
pub mod query;

use std::sync::Arc;

use delaydesk_core::DelayStore;

pub use mutation::validate_new_delay;
pub use query::{ListQuery, average_two_places};

/// Entry point for every delay report operation.
#[derive(Clone)]
pub struct DelayService {
    store: Arc<dyn DelayStore>,
}

impl DelayService {
    pub fn new(store: Arc<dyn DelayStore>) -> Self {
        Self { store }
    }

    /// The store this service operates on.
    pub fn store(&self) -> &Arc<dyn DelayStore> {
        &self.store
    }
}
