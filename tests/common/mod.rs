//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use livestatus_gateway::config::GatewayConfig;
use livestatus_gateway::{HttpServer, Shutdown};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, UnixListener};

/// Queries received by a mock daemon, in arrival order.
pub type QueryLog = Arc<Mutex<Vec<String>>>;

/// Frame `body` the way the daemon does with `ResponseHeader: fixed16`.
pub fn frame(status: u16, body: &str) -> Vec<u8> {
    let mut out = format!("{:03} {:>11}\n", status, body.len()).into_bytes();
    out.extend_from_slice(body.as_bytes());
    out
}

async fn serve_one<S, F>(mut socket: S, log: QueryLog, respond: Arc<F>)
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: Fn(&str) -> (u16, String),
{
    let mut query = String::new();
    if socket.read_to_string(&mut query).await.is_err() {
        return;
    }
    let (status, body) = respond(&query);
    log.lock().unwrap().push(query);

    // Small writes so the gateway sees a fragmented stream.
    for piece in frame(status, &body).chunks(7) {
        if socket.write_all(piece).await.is_err() {
            return;
        }
        let _ = socket.flush().await;
    }
    let _ = socket.shutdown().await;
}

/// Start a mock Livestatus daemon on TCP. `respond` maps the query text to a reply.
pub async fn start_tcp_daemon<F>(respond: F) -> (SocketAddr, QueryLog)
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = QueryLog::default();
    let respond = Arc::new(respond);

    let accept_log = log.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve_one(socket, accept_log.clone(), respond.clone()));
        }
    });

    (addr, log)
}

/// Start a mock Livestatus daemon on a Unix socket at `path`.
#[allow(dead_code)]
pub async fn start_unix_daemon<F>(path: &Path, respond: F) -> QueryLog
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = UnixListener::bind(path).unwrap();
    let log = QueryLog::default();
    let respond = Arc::new(respond);

    let accept_log = log.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(serve_one(socket, accept_log.clone(), respond.clone()));
        }
    });

    log
}

/// A daemon that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_stalled_daemon() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Run the gateway with `config` on an ephemeral port.
pub async fn start_gateway(mut config: GatewayConfig) -> (String, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".into();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (format!("http://{}", addr), shutdown)
}

/// Gateway config pointing at a TCP daemon.
pub fn tcp_config(daemon: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.livestatus.transport = livestatus_gateway::config::TransportKind::Tcp;
    config.livestatus.address = daemon.to_string();
    config
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
