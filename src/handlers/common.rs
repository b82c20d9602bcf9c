use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Body returned by delete endpoints
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pagination metadata carried by every listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Requested page (never clamped to the available range)
    pub current: u64,
    /// Total page count: ceil(total / limit)
    pub pages: u64,
    /// Total matching record count
    pub total: u64,
}

/// Leniently parse a query parameter: a missing or malformed value falls
/// back to the default for that field instead of failing the request.
pub fn parse_or<T>(raw: Option<&str>, default: T) -> T
where
    T: FromStr,
{
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Page numbers are one-based; zero and garbage both mean "first page".
pub fn parse_page(raw: Option<&str>) -> u64 {
    parse_or(raw, 1).max(1)
}

/// Page size, defaulted per listing and kept within sane bounds.
pub fn parse_limit(raw: Option<&str>, default: u64) -> u64 {
    parse_or(raw, default).clamp(1, MAX_PAGE_SIZE)
}

/// Upper bound applied to any requested page size
pub const MAX_PAGE_SIZE: u64 = 100;
