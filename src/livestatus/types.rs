//! Shared bridge types and error definitions.

use thiserror::Error;

/// The daemon's success status.
pub const STATUS_OK: u16 = 200;

/// Errors raised while bridging a request to the Livestatus daemon.
///
/// A non-200 daemon status is not an error; it travels back in [`LivestatusResponse`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The daemon endpoint could not be reached.
    #[error("Livestatus unavailable at {endpoint}: {source}")]
    Unavailable {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection failed after it was established.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Connect or read deadline elapsed.
    #[error("Livestatus {stage} timed out after {secs} seconds")]
    Timeout { stage: &'static str, secs: u64 },

    /// The daemon's reply did not follow the fixed16/json framing.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The inbound request could not be turned into a query.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unavailable { .. } => "unavailable",
            GatewayError::Transport(_) => "transport",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Protocol(_) => "protocol",
            GatewayError::InvalidRequest(_) => "invalid_request",
        }
    }
}

/// A complete daemon reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivestatusResponse {
    /// Status from the fixed16 header.
    pub status: u16,
    /// Exactly as many bytes as the header declared.
    pub body: Vec<u8>,
}

impl LivestatusResponse {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}
