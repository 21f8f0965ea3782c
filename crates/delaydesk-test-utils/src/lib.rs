// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for DelayDesk integration tests.
//!
//! Provides a harness that wires a temp SQLite store, the delay service, and
//! the HTTP router together so tests can drive the API without a socket.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder, TestResponse, sample_request};
