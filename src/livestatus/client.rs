//! One-shot query execution against the daemon.

use std::time::{Duration, Instant};

use crate::config::TimeoutConfig;
use crate::livestatus::normalize::normalize;
use crate::livestatus::query::QueryRequest;
use crate::livestatus::response::read_response;
use crate::livestatus::transport::{send_query, Endpoint};
use crate::livestatus::types::{GatewayError, LivestatusResponse};

/// Body and status to hand back to the HTTP caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReply {
    pub status: u16,
    pub body: Vec<u8>,
    /// Body is JSON (success), as opposed to a daemon error text.
    pub is_json: bool,
}

/// Executes queries, opening a fresh connection for each one.
#[derive(Debug, Clone)]
pub struct LivestatusClient {
    endpoint: Endpoint,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl LivestatusClient {
    pub fn new(endpoint: Endpoint, timeouts: &TimeoutConfig) -> Self {
        Self {
            endpoint,
            connect_timeout: Duration::from_secs(timeouts.connect_secs),
            read_timeout: Duration::from_secs(timeouts.read_secs),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send raw wire text and read the framed response.
    ///
    /// The connection is dropped when this returns, whatever the outcome.
    pub async fn send(&self, query: &str) -> Result<LivestatusResponse, GatewayError> {
        let mut stream = self.endpoint.connect(self.connect_timeout).await?;

        let exchange = async {
            send_query(&mut stream, query).await?;
            read_response(&mut stream).await
        };

        match tokio::time::timeout(self.read_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    timeout_secs = self.read_timeout.as_secs(),
                    "Livestatus read timed out"
                );
                Err(GatewayError::Timeout {
                    stage: "read",
                    secs: self.read_timeout.as_secs(),
                })
            }
        }
    }

    /// Build, send, and (on success) normalize a query.
    pub async fn execute(&self, request: &QueryRequest) -> Result<QueryReply, GatewayError> {
        let start = Instant::now();
        let wire = request.build();
        tracing::debug!(table = %request.table, query = %wire.text, "Sending Livestatus query");

        let response = self.send(&wire.text).await?;

        tracing::debug!(
            table = %request.table,
            status = response.status,
            bytes = response.body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Livestatus response received"
        );

        if !response.is_ok() {
            return Ok(QueryReply {
                status: response.status,
                body: response.body,
                is_json: false,
            });
        }

        if !request.normalize {
            return Ok(QueryReply {
                status: response.status,
                body: response.body,
                is_json: true,
            });
        }

        let records = normalize(&response.body, &wire.header)?;
        let body = serde_json::to_vec(&records)
            .map_err(|e| GatewayError::Protocol(format!("failed to encode records: {}", e)))?;

        Ok(QueryReply {
            status: response.status,
            body,
            is_json: true,
        })
    }
}
