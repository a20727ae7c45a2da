//! Livestatus HTTP Gateway Library
//!
//! Translates REST-style queries into MK Livestatus queries and reshapes the daemon's
//! tabular JSON into lists of records.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod livestatus;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use livestatus::{Endpoint, GatewayError, LivestatusClient, QueryReply, QueryRequest};
