//! Response construction.
//!
//! # Responsibilities
//! - Emit daemon replies with their status and an appropriate content type
//! - Map bridge errors to HTTP status codes
//!
//! # Design Decisions
//! - Unreachable daemon and protocol faults are 502 Bad Gateway
//! - Timeouts are 504 Gateway Timeout
//! - Daemon statuses are forwarded as-is; one that is not valid HTTP becomes 502

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::livestatus::{GatewayError, QueryReply};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::Unavailable { .. }
            | GatewayError::Transport(_)
            | GatewayError::Protocol(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, [(header::CONTENT_TYPE, TEXT)], self.to_string()).into_response()
    }
}

impl IntoResponse for QueryReply {
    fn into_response(self) -> Response {
        let status = match StatusCode::from_u16(self.status) {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(status = self.status, "Daemon status is not a valid HTTP status");
                StatusCode::BAD_GATEWAY
            }
        };
        let content_type = if self.is_json { JSON } else { TEXT };
        (status, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}
