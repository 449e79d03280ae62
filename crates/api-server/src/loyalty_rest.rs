//! Loyalty program REST API endpoints.

use crate::auth::TenantAuth;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::rest::AppState;
use axum::extract::State;
use passdesk_core::loyalty::*;
use uuid::Uuid;

/// GET /api/v1/program — The caller's tier program.
pub async fn get_program(State(state): State<AppState>, auth: TenantAuth) -> ApiResult<TierProgram> {
    auth.respond(state.store.program(auth.tenant_id()))
}

/// PUT /api/v1/program — Replace thresholds, naming and earn rate.
pub async fn update_program(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiJson(program): ApiJson<TierProgram>,
) -> ApiResult<TierProgram> {
    let result = state.store.update_program(auth.tenant_id(), program);
    if result.is_ok() {
        metrics::counter!("loyalty.api.program_updates").increment(1);
    }
    auth.respond(result)
}

/// GET /api/v1/members/:id/tier — Tier badge and progress for one member.
pub async fn member_tier(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TierBadge> {
    let result = state.store.program(auth.tenant_id()).and_then(|program| {
        let member = state.store.get_member(auth.tenant_id(), id)?;
        Ok(state.engine.badge(&member, &program))
    });
    auth.respond(result)
}

/// POST /api/v1/pos/transactions — Simulate a point-of-sale purchase.
pub async fn simulate_transaction(
    State(state): State<AppState>,
    auth: TenantAuth,
    ApiJson(request): ApiJson<TransactionRequest>,
) -> ApiResult<TransactionOutcome> {
    let result = state.store.apply_transaction(
        auth.tenant_id(),
        request.member_id,
        request.amount_cents,
        &state.engine,
    );
    metrics::counter!("loyalty.api.transactions").increment(1);
    auth.respond(result)
}
