// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the `/api/v3` REST surface.
//!
//! Ingestion bodies are taken as raw strings and parsed here so malformed
//! JSON is answered with an `error` acknowledgement instead of axum's
//! plain-text rejection.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dossier_core::DossierError;
use dossier_core::model::{
    Acknowledge, DemandKey, DemandQuery, DemandType, GenericStatus, NotificationEnvelope,
    NotificationEvent, NotificationType, SortDirection,
};
use dossier_engine::ReassignRequest;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, DossierError> {
    Ok(serde_json::from_str(body)?)
}

/// POST /notification
pub async fn post_notification(State(state): State<GatewayState>, body: String) -> ApiResult<Response> {
    let envelope: NotificationEnvelope = parse_body(&body)?;
    let report = state.service.ingest(envelope.notification).await?;
    let ack = Acknowledge::from_warnings(report.warnings).wrapped();
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

/// POST /notification/event
pub async fn post_notification_event(
    State(state): State<GatewayState>,
    body: String,
) -> ApiResult<Response> {
    let event: NotificationEvent = parse_body(&body)?;
    state.service.ingest_event(event).await?;
    let ack = Acknowledge::from_warnings(Vec::new()).wrapped();
    Ok((StatusCode::CREATED, Json(ack)).into_response())
}

/// PUT /notification/reassign
///
/// `201` when rows moved, `200` when nothing matched the old customer.
pub async fn put_reassign(State(state): State<GatewayState>, body: String) -> ApiResult<Response> {
    let request: ReassignRequest = parse_body(&body)?;
    let report = state.service.reassign(&request).await?;
    let status = if report.demands == 0 {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(report)).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListQuery {
    pub id_demand: String,
    pub id_demand_type: String,
    pub customer_id: String,
    #[serde(default)]
    pub notification_type: Option<NotificationType>,
}

/// GET /notification/list
pub async fn get_notifications(
    State(state): State<GatewayState>,
    Query(query): Query<NotificationListQuery>,
) -> ApiResult<Response> {
    let key = DemandKey::new(query.id_demand, query.id_demand_type, query.customer_id);
    let notifications = state
        .service
        .notifications_for_demand(&key, query.notification_type)
        .await?;
    Ok(Json(notifications).into_response())
}

/// GET /notification/type
pub async fn get_notification_types(State(state): State<GatewayState>) -> Json<Vec<NotificationType>> {
    Json(state.service.notification_types())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandListQuery {
    pub customer_id: String,
    #[serde(default)]
    pub id_demand_type: Option<String>,
    #[serde(default)]
    pub notification_type: Option<NotificationType>,
    /// `ASC` or `DESC`; empty means newest first.
    #[serde(default)]
    pub direction_date_order_by: Option<String>,
}

fn parse_direction(raw: Option<&str>) -> Result<SortDirection, DossierError> {
    match raw.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(SortDirection::default()),
        Some(direction) => direction.parse().map_err(|_| {
            DossierError::Validation(format!(
                "directionDateOrderBy must be ASC or DESC, got {direction}"
            ))
        }),
    }
}

fn type_filter(id_demand_type: Option<String>) -> Vec<String> {
    id_demand_type
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .into_iter()
        .collect()
}

/// GET /demand/list
pub async fn get_demands(
    State(state): State<GatewayState>,
    Query(query): Query<DemandListQuery>,
) -> ApiResult<Response> {
    let direction = parse_direction(query.direction_date_order_by.as_deref())?;
    let filter = DemandQuery {
        demand_type_ids: type_filter(query.id_demand_type),
        notification_type: query.notification_type,
        direction,
        ..DemandQuery::for_customer(query.customer_id)
    };
    let demands = state.service.demands_for_customer(filter).await?;
    Ok(Json(demands).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandStatusQuery {
    #[serde(default)]
    pub customer_id: String,
    /// Comma separated generic status ids.
    #[serde(default)]
    pub list_status: String,
    #[serde(default)]
    pub id_demand_type: Option<String>,
    #[serde(default)]
    pub notification_type: Option<NotificationType>,
    #[serde(default)]
    pub category_code: Option<String>,
}

fn parse_status_list(raw: &str) -> Result<Vec<i32>, DossierError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| {
                DossierError::Validation(format!("listStatus holds a non numeric status: {s}"))
            })
        })
        .collect()
}

/// GET /demand/status
pub async fn get_demands_by_status(
    State(state): State<GatewayState>,
    Query(query): Query<DemandStatusQuery>,
) -> ApiResult<Response> {
    let filter = DemandQuery {
        demand_type_ids: type_filter(query.id_demand_type),
        status_ids: parse_status_list(&query.list_status)?,
        notification_type: query.notification_type,
        ..DemandQuery::for_customer(query.customer_id)
    };
    let demands = state
        .service
        .demands_by_status(filter, query.category_code.as_deref())
        .await?;
    Ok(Json(demands).into_response())
}

/// DELETE /demand/customer/{customer_id}
pub async fn delete_customer(
    State(state): State<GatewayState>,
    Path(customer_id): Path<String>,
) -> ApiResult<Response> {
    let report = state.service.erase_customer(&customer_id).await?;
    Ok(Json(report).into_response())
}

/// GET /demandtype
pub async fn get_demand_types(State(state): State<GatewayState>) -> ApiResult<Response> {
    Ok(Json(state.service.list_demand_types().await?).into_response())
}

/// POST /demandtype
pub async fn post_demand_type(State(state): State<GatewayState>, body: String) -> ApiResult<Response> {
    let demand_type: DemandType = parse_body(&body)?;
    let created = state.service.create_demand_type(demand_type).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LabelRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericStatusRequest {
    pub generic_status_id: i32,
}

/// GET /temporarystatus
pub async fn get_temporary_statuses(State(state): State<GatewayState>) -> ApiResult<Response> {
    let statuses = state.service.registry().list().await?;
    Ok(Json(statuses.as_ref().clone()).into_response())
}

/// POST /temporarystatus
pub async fn post_temporary_status(
    State(state): State<GatewayState>,
    body: String,
) -> ApiResult<Response> {
    let request: LabelRequest = parse_body(&body)?;
    let created = state.service.registry().create(&request.label).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// GET /temporarystatus/{id}
pub async fn get_temporary_status(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let status = state
        .service
        .registry()
        .get(id)
        .await?
        .ok_or_else(|| temporary_status_not_found(id))?;
    Ok(Json(status).into_response())
}

/// PUT /temporarystatus/{id}
pub async fn put_temporary_status(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    body: String,
) -> ApiResult<Response> {
    let request: LabelRequest = parse_body(&body)?;
    state.service.registry().relabel(id, &request.label).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// DELETE /temporarystatus/{id}
pub async fn delete_temporary_status(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    if !state.service.registry().delete(id).await? {
        return Err(temporary_status_not_found(id).into());
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// PUT /temporarystatus/{id}/generic
///
/// Maps the entry to a canonical status and backfills demands and contents.
pub async fn put_temporary_status_generic(
    State(state): State<GatewayState>,
    Path(id): Path<i64>,
    body: String,
) -> ApiResult<Response> {
    let request: GenericStatusRequest = parse_body(&body)?;
    let status = GenericStatus::from_id(request.generic_status_id).ok_or_else(|| {
        DossierError::Validation(format!(
            "unknown generic status id {}",
            request.generic_status_id
        ))
    })?;
    let report = state
        .service
        .registry()
        .map_label_to_generic_status(id, status)
        .await?;
    Ok(Json(report).into_response())
}

fn temporary_status_not_found(id: i64) -> DossierError {
    DossierError::NotFound {
        entity: "temporary status",
        id: id.to_string(),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericStatusView {
    pub id: i32,
    pub status: GenericStatus,
    pub label: &'static str,
    pub is_final: bool,
}

/// GET /status
pub async fn get_generic_statuses(State(state): State<GatewayState>) -> Json<Vec<GenericStatusView>> {
    Json(
        state
            .service
            .generic_statuses()
            .iter()
            .map(|status| GenericStatusView {
                id: status.id(),
                status: *status,
                label: status.label(),
                is_final: status.is_final(),
            })
            .collect(),
    )
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
///
/// Unauthenticated. `503` unless both stores answer healthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status) = match state.service.health().await {
        Ok(health) if health.is_healthy() => (StatusCode::OK, "ok".to_string()),
        Ok(health) => (StatusCode::SERVICE_UNAVAILABLE, format!("{health:?}")),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
        .into_response()
}
