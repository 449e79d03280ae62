//! REST handlers for tenants, members, wallet webhooks and operational endpoints.

use crate::auth::{AdminAuth, TenantAuth};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath};
use crate::store::{BulkEnrollOutcome, PassdeskStore};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use passdesk_core::types::*;
use passdesk_core::ApiEnvelope;
use passdesk_loyalty::TierEngine;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Maximum rows accepted by one bulk import.
const MAX_BULK_ROWS: usize = 10_000;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PassdeskStore>,
    pub engine: Arc<TierEngine>,
    pub admin_key: String,
    pub node_id: String,
    pub start_time: Instant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub node_id: String,
    pub uptime_secs: u64,
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ─── Tenants ───────────────────────────────────────────────────────────────

/// POST /api/v1/tenants — Provision a tenant (admin only).
pub async fn create_tenant(
    State(state): State<AppState>,
    admin: AdminAuth,
    ApiJson(req): ApiJson<CreateTenantRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<CreateTenantResponse>>), ApiError> {
    match state.store.create_tenant(req, state.engine.default_program()) {
        Ok((tenant, api_key)) => {
            let metadata = admin.metadata();
            Ok((
                StatusCode::CREATED,
                Json(ApiEnvelope::success(CreateTenantResponse { tenant, api_key }, metadata)),
            ))
        }
        Err(e) => Err(ApiError::new(e, admin.metadata())),
    }
}

// ─── Members ───────────────────────────────────────────────────────────────

/// GET /api/v1/members — All members of the caller's tenant, newest first.
pub async fn list_members(State(state): State<AppState>, auth: TenantAuth) -> ApiResult<Vec<Member>> {
    auth.respond(Ok(state.store.list_members(auth.tenant_id())))
}

/// GET /api/v1/members/:id
pub async fn get_member(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Member> {
    auth.respond(state.store.get_member(auth.tenant_id(), id))
}

/// POST /api/v1/members — Record a member after pass issuance.
pub async fn enroll_member(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiJson(req): ApiJson<EnrollMemberRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<Member>>), ApiError> {
    auth.respond(state.store.enroll_member(auth.tenant_id(), req))
        .map(|body| (StatusCode::CREATED, body))
}

/// POST /api/v1/imports/members — Import pre-parsed CSV rows.
pub async fn bulk_enroll(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiJson(req): ApiJson<BulkEnrollRequest>,
) -> ApiResult<BulkEnrollOutcome> {
    if req.members.len() > MAX_BULK_ROWS {
        return Err(ApiError::new(
            passdesk_core::PassdeskError::Validation(format!(
                "bulk import limited to {MAX_BULK_ROWS} rows"
            )),
            auth.metadata(),
        ));
    }
    auth.respond(state.store.enroll_bulk(auth.tenant_id(), req.members))
}

// ─── Webhooks ──────────────────────────────────────────────────────────────

/// POST /api/v1/webhooks/wallet — Pass installed / uninstalled on a device.
pub async fn wallet_webhook(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiJson(event): ApiJson<WalletEvent>,
) -> ApiResult<Member> {
    auth.respond(state.store.apply_wallet_event(auth.tenant_id(), &event))
}
