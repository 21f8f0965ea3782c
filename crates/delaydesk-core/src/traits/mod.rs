// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams between DelayDesk crates.

pub mod store;

pub use store::DelayStore;
