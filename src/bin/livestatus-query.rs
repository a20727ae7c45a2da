use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

use livestatus_gateway::config::TimeoutConfig;
use livestatus_gateway::{Endpoint, LivestatusClient, QueryRequest};

#[derive(Parser)]
#[command(name = "livestatus-query")]
#[command(about = "Run a single Livestatus query and print the result as JSON", long_about = None)]
struct Cli {
    /// Table to query (hosts, services, hostgroups, ...)
    table: String,

    /// Unix socket of the Livestatus daemon
    #[arg(short, long, default_value = "/home/nagios/var/rw/live", conflicts_with = "tcp")]
    socket: PathBuf,

    /// TCP address of the Livestatus daemon (host:port)
    #[arg(short, long)]
    tcp: Option<String>,

    /// Column to select (repeatable)
    #[arg(short, long = "column")]
    columns: Vec<String>,

    /// Filter line, passed verbatim (repeatable)
    #[arg(short, long = "filter")]
    filters: Vec<String>,

    /// Stats line, passed verbatim (repeatable)
    #[arg(long = "stats")]
    stats: Vec<String>,

    /// Maximum number of rows
    #[arg(short, long)]
    limit: Option<u64>,

    /// Print the daemon's rows without reshaping them into records
    #[arg(long)]
    raw: bool,

    /// Seconds to wait for the full response
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let endpoint = match cli.tcp {
        Some(addr) => Endpoint::Tcp(addr),
        None => Endpoint::Unix(cli.socket),
    };
    let timeouts = TimeoutConfig {
        read_secs: cli.timeout,
        ..TimeoutConfig::default()
    };
    let client = LivestatusClient::new(endpoint, &timeouts);

    let mut request = QueryRequest::new(cli.table)
        .columns(cli.columns)
        .normalize(!cli.raw);
    request.filters = cli.filters;
    request.stats = cli.stats;
    request.limit = cli.limit;

    let reply = client.execute(&request).await?;
    if !reply.is_json {
        eprintln!("Error: Livestatus returned status {}", reply.status);
        eprint!("{}", String::from_utf8_lossy(&reply.body));
        return Ok(ExitCode::FAILURE);
    }

    let json: Value = if reply.body.is_empty() {
        Value::Array(Vec::new())
    } else {
        serde_json::from_slice(&reply.body)?
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(ExitCode::SUCCESS)
}
