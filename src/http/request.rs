//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Turn path segments and query parameters into a [`QueryRequest`]
//!
//! # Design Decisions
//! - Repeated keys (`column`, `filter`, `stats`) are collected in order, so the raw
//!   query string is parsed with `form_urlencoded` instead of Axum's `Query`
//! - Filter and stats text is not inspected; only the table name and numeric/boolean
//!   parameters are validated

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::livestatus::{GatewayError, QueryRequest};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a query for `table` from the raw query string.
pub fn table_query(table: &str, raw: Option<&str>) -> Result<QueryRequest, GatewayError> {
    validate_table(table)?;
    apply_params(QueryRequest::new(table), raw)
}

/// Layer query parameters onto `base`.
///
/// `column`, `filter` and `stats` append to what `base` already holds.
pub fn apply_params(mut base: QueryRequest, raw: Option<&str>) -> Result<QueryRequest, GatewayError> {
    let Some(raw) = raw else {
        return Ok(base);
    };

    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "column" => base.columns.push(value.into_owned()),
            "filter" => base.filters.push(value.into_owned()),
            "stats" => base.stats.push(value.into_owned()),
            "limit" => {
                let limit = value.trim().parse::<u64>().map_err(|_| {
                    GatewayError::InvalidRequest(format!("limit must be a non-negative integer, got '{}'", value))
                })?;
                base.limit = Some(limit);
            }
            "normalize" => base.normalize = parse_bool(&value)?,
            other => tracing::debug!(param = %other, "Ignoring unknown query parameter"),
        }
    }

    Ok(base)
}

fn validate_table(table: &str) -> Result<(), GatewayError> {
    if table.is_empty() || !table.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(GatewayError::InvalidRequest(format!(
            "invalid table name '{}'",
            table
        )));
    }
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool, GatewayError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(GatewayError::InvalidRequest(format!(
            "normalize must be a boolean, got '{}'",
            value
        ))),
    }
}
