//! Body and path extractors whose rejections are reported in the response
//! envelope instead of axum's plain-text bodies.

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body. Malformed or mistyped bodies become `validation_failed`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters. Unparseable segments become `validation_failed`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
