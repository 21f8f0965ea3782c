// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use delaydesk_core::{DelayError, FieldViolation, ViolationKind};
use tracing::{error, warn};

use crate::envelope::Envelope;

pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: routeNumber, neighborhood, delayMinutes, reason, busId";

/// The API operation a failure happened in. Picks the 500 message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListDelays,
    AggregateByNeighborhood,
    CreateDelay,
    DeleteDelay,
    ResolveDelay,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Self::ListDelays => "Error fetching delays",
            Self::AggregateByNeighborhood => "Error aggregating delay data",
            Self::CreateDelay => "Error reporting delay",
            Self::DeleteDelay => "Error deleting delay",
            Self::ResolveDelay => "Error resolving delay",
        }
    }
}

/// An error on its way out of a handler.
#[derive(Debug)]
pub enum ApiError {
    /// A service call failed.
    Service {
        operation: Operation,
        source: DelayError,
    },
    /// The request could not be decoded.
    BadRequest { message: &'static str, detail: String },
}

impl ApiError {
    pub fn service(operation: Operation) -> impl FnOnce(DelayError) -> Self {
        move |source| Self::Service { operation, source }
    }

    pub fn invalid_body(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            message: "Invalid request body",
            detail: detail.into(),
        }
    }

    pub fn invalid_query(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            message: "Invalid query parameters",
            detail: detail.into(),
        }
    }
}

fn validation_message(operation: Operation, violations: &[FieldViolation]) -> &'static str {
    match operation {
        Operation::CreateDelay
            if violations.iter().all(|v| v.kind == ViolationKind::Missing) =>
        {
            MISSING_FIELDS_MESSAGE
        }
        Operation::CreateDelay => "Invalid delay report",
        Operation::ListDelays => "Invalid status filter",
        _ => "Invalid request",
    }
}

fn join(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::BadRequest { message, detail } => {
                warn!(%detail, "rejected request");
                (StatusCode::BAD_REQUEST, Envelope::failure(message, Some(detail)))
            }
            Self::Service { operation, source } => match source {
                DelayError::Validation { violations } => (
                    StatusCode::BAD_REQUEST,
                    Envelope::failure(
                        validation_message(operation, &violations),
                        Some(join(&violations)),
                    ),
                ),
                DelayError::NotFound { id } => (
                    StatusCode::NOT_FOUND,
                    Envelope::failure("Delay not found", Some(format!("no delay with id {id}"))),
                ),
                other => {
                    error!(?operation, error = %other, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Envelope::failure(operation.failure_message(), Some(other.to_string())),
                    )
                }
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(field: &'static str, kind: ViolationKind) -> FieldViolation {
        FieldViolation { field, kind }
    }

    #[test]
    fn all_missing_uses_required_fields_message() {
        let violations = [
            violation("routeNumber", ViolationKind::Missing),
            violation("busId", ViolationKind::Missing),
        ];
        assert_eq!(
            validation_message(Operation::CreateDelay, &violations),
            MISSING_FIELDS_MESSAGE
        );
        assert_eq!(join(&violations), "routeNumber is required, busId is required");
    }

    #[test]
    fn mixed_violations_use_generic_message() {
        let violations = [
            violation("routeNumber", ViolationKind::Missing),
            violation("delayMinutes", ViolationKind::Negative),
        ];
        assert_eq!(
            validation_message(Operation::CreateDelay, &violations),
            "Invalid delay report"
        );
    }

    #[test]
    fn status_codes() {
        let not_found = ApiError::service(Operation::DeleteDelay)(DelayError::not_found("x"));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let storage = ApiError::service(Operation::ListDelays)(DelayError::Storage {
            source: "disk gone".into(),
        });
        assert_eq!(
            storage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let body = ApiError::invalid_body("EOF while parsing");
        assert_eq!(body.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn failure_messages_name_the_operation() {
        assert_eq!(
            Operation::AggregateByNeighborhood.failure_message(),
            "Error aggregating delay data"
        );
        assert_eq!(Operation::ResolveDelay.failure_message(), "Error resolving delay");
    }
}
