//! Upstream connection handling.
//!
//! # Responsibilities
//! - Open one stream per query to a Unix socket or TCP endpoint
//! - Send the query and half-close the write side
//!
//! # Design Decisions
//! - The daemon starts processing on EOF of input, so the write half must be shut down
//!   while the read half stays open for the response
//! - Connect failures are reported as `Unavailable`, never as a daemon status

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpStream, UnixStream};

use crate::livestatus::types::GatewayError;

/// Where the Livestatus daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket path.
    Unix(PathBuf),
    /// `host:port` TCP address.
    Tcp(String),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp(addr) => write!(f, "tcp:{}", addr),
        }
    }
}

impl Endpoint {
    /// Connect to the daemon, bounded by `timeout`.
    pub async fn connect(&self, timeout: Duration) -> Result<UpstreamStream, GatewayError> {
        let connect = async {
            match self {
                Endpoint::Unix(path) => UnixStream::connect(path).await.map(UpstreamStream::Unix),
                Endpoint::Tcp(addr) => TcpStream::connect(addr.as_str())
                    .await
                    .map(UpstreamStream::Tcp),
            }
        };

        match tokio::time::timeout(timeout, connect).await {
            Ok(Ok(stream)) => {
                tracing::debug!(endpoint = %self, "Connected to Livestatus");
                Ok(stream)
            }
            Ok(Err(source)) => {
                tracing::warn!(endpoint = %self, error = %source, "Livestatus connect failed");
                Err(GatewayError::Unavailable {
                    endpoint: self.to_string(),
                    source,
                })
            }
            Err(_) => Err(GatewayError::Timeout {
                stage: "connect",
                secs: timeout.as_secs(),
            }),
        }
    }
}

/// A connected stream to the daemon, Unix or TCP.
#[derive(Debug)]
pub enum UpstreamStream {
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl AsyncRead for UpstreamStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Unix(s) => Pin::new(s).poll_read(cx, buf),
            UpstreamStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for UpstreamStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            UpstreamStream::Unix(s) => Pin::new(s).poll_write(cx, buf),
            UpstreamStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Unix(s) => Pin::new(s).poll_flush(cx),
            UpstreamStream::Tcp(s) => Pin::new(s).poll_flush(cx),
        }
    }

    // Both stream types shut down only the write direction here.
    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            UpstreamStream::Unix(s) => Pin::new(s).poll_shutdown(cx),
            UpstreamStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Write the whole query and signal end of input.
pub async fn send_query<W>(stream: &mut W, query: &str) -> Result<(), GatewayError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(query.as_bytes()).await?;
    stream.shutdown().await?;
    tracing::trace!(bytes = query.len(), "Query sent, write half closed");
    Ok(())
}
