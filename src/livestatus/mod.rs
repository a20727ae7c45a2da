//! Livestatus protocol bridge.
//!
//! # Data Flow
//! ```text
//! QueryRequest
//!     → query.rs (GET/Columns/Filter/Stats/Limit + fixed trailer)
//!     → transport.rs (connect, write, shutdown write half)
//!     → response.rs (16-byte header, then exactly `length` body bytes)
//!     → normalize.rs (rows → records, status 200 only)
//!     → QueryReply (body, status)
//! ```
//!
//! # Design Decisions
//! - One connection per query, released on every exit path
//! - No retries: each inbound request maps to one upstream attempt
//! - Daemon errors (status != 200) are passed through, not raised

pub mod client;
pub mod normalize;
pub mod query;
pub mod response;
pub mod transport;
pub mod types;

pub use client::{LivestatusClient, QueryReply};
pub use normalize::{normalize, Record};
pub use query::{HeaderSource, QueryRequest, WireQuery};
pub use response::{read_response, ResponseHeader};
pub use transport::{send_query, Endpoint, UpstreamStream};
pub use types::{GatewayError, LivestatusResponse, STATUS_OK};
