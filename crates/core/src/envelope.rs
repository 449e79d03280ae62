//! Response envelope shared by every API endpoint.
//!
//! On the wire this is the flat `{success, data, error, metadata}` object the
//! dashboard expects; in Rust it is a tagged enum so a handler can never emit
//! both `data` and `error`, or neither.

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub generated_at: DateTime<Utc>,
}

impl ResponseMetadata {
    pub fn new(request_id: Uuid, tenant_id: Option<Uuid>) -> Self {
        Self {
            request_id,
            tenant_id,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiEnvelope<T> {
    Success { data: T, metadata: ResponseMetadata },
    Failure { error: ErrorBody, metadata: ResponseMetadata },
}

impl<T> ApiEnvelope<T> {
    pub fn success(data: T, metadata: ResponseMetadata) -> Self {
        ApiEnvelope::Success { data, metadata }
    }

    pub fn failure(
        code: impl Into<String>,
        message: impl Into<String>,
        metadata: ResponseMetadata,
    ) -> Self {
        ApiEnvelope::Failure {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiEnvelope::Success { .. })
    }

    pub fn metadata(&self) -> &ResponseMetadata {
        match self {
            ApiEnvelope::Success { metadata, .. } | ApiEnvelope::Failure { metadata, .. } => {
                metadata
            }
        }
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ApiEnvelope", 4)?;
        match self {
            ApiEnvelope::Success { data, metadata } => {
                s.serialize_field("success", &true)?;
                s.serialize_field("data", data)?;
                s.serialize_field("error", &Option::<ErrorBody>::None)?;
                s.serialize_field("metadata", metadata)?;
            }
            ApiEnvelope::Failure { error, metadata } => {
                s.serialize_field("success", &false)?;
                s.serialize_field("data", &Option::<()>::None)?;
                s.serialize_field("error", error)?;
                s.serialize_field("metadata", metadata)?;
            }
        }
        s.end()
    }
}
