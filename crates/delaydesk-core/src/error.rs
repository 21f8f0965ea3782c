// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for DelayDesk.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The primary error type shared by the store, the services, and the HTTP surface.
#[derive(Debug, Error)]
pub enum DelayError {
    /// Client-supplied data failed a required-field or type check.
    #[error("validation failed: {}", join_violations(violations))]
    Validation { violations: Vec<FieldViolation> },

    /// The operation targeted an id that does not exist.
    #[error("delay report not found: {id}")]
    NotFound { id: String },

    /// Storage backend errors (connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP server errors (bind failure, serve loop failure).
    #[error("server error: {message}")]
    Server {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl DelayError {
    /// Builds a validation error from a single violation.
    pub fn invalid(field: &'static str, kind: ViolationKind) -> Self {
        Self::Validation {
            violations: vec![FieldViolation { field, kind }],
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// One field that failed validation, named by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    /// Absent, null, or blank after trimming.
    Missing,
    /// A number below zero where only non-negative values are allowed.
    Negative,
    /// Could not be read as an integer.
    NotAnInteger,
    /// An integer too large for the field.
    OutOfRange,
    /// A value outside the accepted set.
    Unsupported,
    /// Neither a string nor a number.
    NotText,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Missing => "is required",
            Self::Negative => "must not be negative",
            Self::NotAnInteger => "must be an integer",
            Self::OutOfRange => "is out of range",
            Self::Unsupported => "has an unsupported value",
            Self::NotText => "must be a string",
        };
        f.write_str(text)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
