// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface for DelayDesk.
//!
//! Exposes the delay service as a JSON REST API. Every delay endpoint answers
//! with the [`Envelope`] wrapper; failures are mapped to status codes by
//! [`ApiError`].

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod server;

pub use envelope::Envelope;
pub use error::{ApiError, Operation};
pub use server::{AppState, router, start_server};
