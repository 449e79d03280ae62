//! Request authentication. Handlers receive the caller's tenant as an
//! explicit extractor argument; nothing is read from ambient state.

use crate::error::{ApiError, ApiResult};
use crate::rest::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use passdesk_core::types::TenantContext;
use passdesk_core::{ApiEnvelope, PassdeskError, PassdeskResult, ResponseMetadata};
use tracing::warn;
use uuid::Uuid;

/// Header carrying the platform admin key for tenant provisioning.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Caller authenticated with a tenant API key (`Authorization: Bearer ...`).
#[derive(Debug, Clone)]
pub struct TenantAuth(pub TenantContext);

impl TenantAuth {
    pub fn tenant_id(&self) -> Uuid {
        self.0.tenant_id
    }

    pub fn metadata(&self) -> ResponseMetadata {
        ResponseMetadata::new(self.0.request_id, Some(self.0.tenant_id))
    }

    /// Wrap a domain result in the response envelope.
    pub fn respond<T>(&self, result: PassdeskResult<T>) -> ApiResult<T> {
        match result {
            Ok(data) => Ok(Json(ApiEnvelope::success(data, self.metadata()))),
            Err(e) => Err(ApiError::new(e, self.metadata())),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for TenantAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = Uuid::new_v4();
        let unauthorized = |msg: &str| {
            metrics::counter!("api.auth_failures").increment(1);
            ApiError::new(
                PassdeskError::Unauthorized(msg.to_string()),
                ResponseMetadata::new(request_id, None),
            )
        };

        let Some(key) = bearer_token(parts) else {
            return Err(unauthorized("missing bearer token"));
        };
        let Some(tenant_id) = state.store.tenant_for_key(key) else {
            warn!(path = %parts.uri.path(), "Unknown tenant API key");
            return Err(unauthorized("invalid API key"));
        };

        Ok(TenantAuth(TenantContext {
            tenant_id,
            request_id,
        }))
    }
}

/// Caller holding the platform admin key.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub request_id: Uuid,
}

impl AdminAuth {
    pub fn metadata(&self) -> ResponseMetadata {
        ResponseMetadata::new(self.request_id, None)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = Uuid::new_v4();
        let provided = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if provided != Some(state.admin_key.as_str()) {
            warn!(path = %parts.uri.path(), "Admin key rejected");
            metrics::counter!("api.auth_failures").increment(1);
            return Err(ApiError::new(
                PassdeskError::Unauthorized("admin key required".to_string()),
                ResponseMetadata::new(request_id, None),
            ));
        }
        Ok(AdminAuth { request_id })
    }
}
