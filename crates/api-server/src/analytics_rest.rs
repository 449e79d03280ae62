//! Enrollment analytics endpoint.

use crate::auth::TenantAuth;
use crate::error::ApiResult;
use crate::rest::AppState;
use axum::extract::State;
use passdesk_core::types::{AnalyticsResult, TierDistribution};
use serde::Serialize;

/// Enrollment analytics plus the current tier mix.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentAnalyticsResponse {
    #[serde(flatten)]
    pub enrollment: AnalyticsResult,
    pub tier_distribution: TierDistribution,
}

/// GET /api/v1/analytics/enrollment
pub async fn enrollment_analytics(
    State(state): State<AppState>,
    auth: TenantAuth,
) -> ApiResult<EnrollmentAnalyticsResponse> {
    let result = state.store.program(auth.tenant_id()).map(|program| {
        let members = state.store.list_members(auth.tenant_id());
        let records: Vec<_> = members.iter().map(|m| m.record()).collect();
        EnrollmentAnalyticsResponse {
            enrollment: passdesk_analytics::aggregate(&records),
            tier_distribution: state.engine.distribution(&members, &program),
        }
    });
    metrics::counter!("analytics.api.requests").increment(1);
    auth.respond(result)
}
