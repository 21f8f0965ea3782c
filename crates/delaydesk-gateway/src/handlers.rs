// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the delay REST API.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use delaydesk_core::{CreateDelayRequest, DelayId, DelayReport, NeighborhoodSummary};
use delaydesk_service::ListQuery;
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::error::{ApiError, Operation};
use crate::server::AppState;

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Raw query string of GET /api/delays. Values are parsed leniently later.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response body for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Transport Analytics API is running",
    })
}

/// GET /api/delays?page&limit&status
pub async fn list_delays(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Vec<DelayReport>> {
    let Query(params) = params.map_err(|e| ApiError::invalid_query(e.body_text()))?;
    let query = ListQuery::from_raw(
        params.status.as_deref(),
        params.page.as_deref(),
        params.limit.as_deref(),
    )
    .map_err(ApiError::service(Operation::ListDelays))?;

    let page = state
        .service
        .list(query)
        .await
        .map_err(ApiError::service(Operation::ListDelays))?;
    Ok(Json(Envelope::ok(page.items).with_pagination(page.pagination)))
}

/// GET /api/delays/aggregate/by-neighborhood
pub async fn aggregate_by_neighborhood(
    State(state): State<AppState>,
) -> ApiResult<Vec<NeighborhoodSummary>> {
    let groups = state
        .service
        .aggregate_by_neighborhood()
        .await
        .map_err(ApiError::service(Operation::AggregateByNeighborhood))?;
    let total = groups.len() as u64;
    Ok(Json(Envelope::ok(groups).with_total(total)))
}

/// POST /api/delays
pub async fn create_delay(
    State(state): State<AppState>,
    body: Result<Json<CreateDelayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<DelayReport>>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let created = state
        .service
        .create(request)
        .await
        .map_err(ApiError::service(Operation::CreateDelay))?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(created).with_message("Delay reported successfully")),
    ))
}

/// DELETE /api/delays/{id}
pub async fn delete_delay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DelayReport> {
    let removed = state
        .service
        .delete(&DelayId(id))
        .await
        .map_err(ApiError::service(Operation::DeleteDelay))?;
    Ok(Json(
        Envelope::ok(removed).with_message("Resolved issue deleted successfully"),
    ))
}

/// PATCH /api/delays/{id}/resolve
pub async fn resolve_delay(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DelayReport> {
    let resolved = state
        .service
        .resolve(&DelayId(id))
        .await
        .map_err(ApiError::service(Operation::ResolveDelay))?;
    Ok(Json(Envelope::ok(resolved).with_message("Delay marked as resolved")))
}

/// Fallback for paths outside the API.
pub async fn not_found() -> (StatusCode, Json<Envelope<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(Envelope::failure("Route not found", None)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_deserialize_from_query_string() {
        let Query(params): Query<ListParams> =
            Query::try_from_uri(&"/api/delays?page=2abc&status=all".parse().unwrap()).unwrap();
        assert_eq!(params.page.as_deref(), Some("2abc"));
        assert_eq!(params.status.as_deref(), Some("all"));
        assert!(params.limit.is_none());
    }

    #[test]
    fn health_response_serializes() {
        let body = serde_json::to_value(HealthResponse {
            status: "OK",
            message: "Transport Analytics API is running",
        })
        .unwrap();
        assert_eq!(body["status"], "OK");
        assert_eq!(body["message"], "Transport Analytics API is running");
    }
}
