// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Write side: create, resolve, and delete delay reports.

use delaydesk_core::parse::leading_integer;
use delaydesk_core::types::now_millis;
use delaydesk_core::{
    CreateDelayRequest, DelayError, DelayId, DelayReport, DelayStatus, FieldViolation,
    NewDelayReport, ViolationKind,
};
use serde_json::Value;
use tracing::info;

use crate::DelayService;

/// Checks a create payload and builds the report to insert.
///
/// Every field is checked so that one response names all problems. Text
/// fields are trimmed; the new report is always active.
pub fn validate_new_delay(req: &CreateDelayRequest) -> Result<NewDelayReport, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let route_number = required_text("routeNumber", req.route_number.as_ref(), &mut violations);
    let neighborhood = required_text("neighborhood", req.neighborhood.as_ref(), &mut violations);
    let delay_minutes = match coerce_delay_minutes(req.delay_minutes.as_ref()) {
        Ok(minutes) => Some(minutes),
        Err(kind) => {
            violations.push(FieldViolation {
                field: "delayMinutes",
                kind,
            });
            None
        }
    };
    let reason = required_text("reason", req.reason.as_ref(), &mut violations);
    let bus_id = required_text("busId", req.bus_id.as_ref(), &mut violations);

    match (route_number, neighborhood, delay_minutes, reason, bus_id) {
        (Some(route_number), Some(neighborhood), Some(delay_minutes), Some(reason), Some(bus_id))
            if violations.is_empty() =>
        {
            Ok(NewDelayReport {
                route_number,
                neighborhood,
                delay_minutes,
                reason,
                bus_id,
                reported_at: now_millis(),
                status: DelayStatus::Active,
            })
        }
        _ => Err(violations),
    }
}

fn required_text(
    field: &'static str,
    value: Option<&Value>,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    match coerce_text(value) {
        Ok(text) => Some(text),
        Err(kind) => {
            violations.push(FieldViolation { field, kind });
            None
        }
    }
}

/// Strings are trimmed and numbers take their JSON text, so `42` and `"42"`
/// store the same route number.
fn coerce_text(value: Option<&Value>) -> Result<String, ViolationKind> {
    let text = match value {
        None | Some(Value::Null) => return Err(ViolationKind::Missing),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => return Err(ViolationKind::NotText),
    };
    if text.is_empty() {
        Err(ViolationKind::Missing)
    } else {
        Ok(text)
    }
}

/// Reads `delayMinutes` from whatever JSON the client sent.
///
/// Integers pass through, floats truncate toward zero, and strings take
/// their leading integer. Zero is a valid value.
fn coerce_delay_minutes(value: Option<&Value>) -> Result<u32, ViolationKind> {
    match value {
        None | Some(Value::Null) => Err(ViolationKind::Missing),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                minutes_from_i64(i)
            } else if n.is_u64() {
                Err(ViolationKind::OutOfRange)
            } else {
                minutes_from_f64(n.as_f64().ok_or(ViolationKind::NotAnInteger)?)
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(ViolationKind::Missing);
            }
            leading_integer(trimmed)
                .ok_or(ViolationKind::NotAnInteger)
                .and_then(minutes_from_i64)
        }
        Some(_) => Err(ViolationKind::NotAnInteger),
    }
}

fn minutes_from_i64(value: i64) -> Result<u32, ViolationKind> {
    if value < 0 {
        return Err(ViolationKind::Negative);
    }
    u32::try_from(value).map_err(|_| ViolationKind::OutOfRange)
}

fn minutes_from_f64(value: f64) -> Result<u32, ViolationKind> {
    if !value.is_finite() {
        return Err(ViolationKind::NotAnInteger);
    }
    let truncated = value.trunc();
    if truncated < 0.0 {
        Err(ViolationKind::Negative)
    } else if truncated > f64::from(u32::MAX) {
        Err(ViolationKind::OutOfRange)
    } else {
        Ok(truncated as u32)
    }
}

impl DelayService {
    /// Validates and persists a new report. The stored report is always active.
    pub async fn create(&self, req: CreateDelayRequest) -> Result<DelayReport, DelayError> {
        let report =
            validate_new_delay(&req).map_err(|violations| DelayError::Validation { violations })?;
        let stored = self.store.insert(report).await?;
        info!(
            id = %stored.id,
            neighborhood = %stored.neighborhood,
            delay_minutes = stored.delay_minutes,
            "delay reported"
        );
        Ok(stored)
    }

    /// Marks a report resolved. Resolving an already resolved report succeeds.
    pub async fn resolve(&self, id: &DelayId) -> Result<DelayReport, DelayError> {
        let updated = self
            .store
            .update_status(id, DelayStatus::Resolved)
            .await?
            .ok_or_else(|| DelayError::not_found(id.as_str()))?;
        info!(id = %id, "delay resolved");
        Ok(updated)
    }

    /// Permanently removes a report, returning its last state.
    pub async fn delete(&self, id: &DelayId) -> Result<DelayReport, DelayError> {
        let removed = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or_else(|| DelayError::not_found(id.as_str()))?;
        info!(id = %id, "delay deleted");
        Ok(removed)
    }
}
