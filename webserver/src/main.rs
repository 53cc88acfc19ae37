//! WebServer entry point
//!
//! Builds one search engine from command line and environment settings and
//! serves it over HTTP until Ctrl+C.

use clap::Parser;
use engine::{build_engine, EngineArgs};
use shared::{logging, ProcessId};
use std::net::SocketAddr;

use webserver::WebServer;

/// Command line arguments for the HTTP front end
#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP API for namescout search jobs")]
struct Args {
    /// Interface to bind
    #[arg(long, env = "NAMESCOUT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port for HTTP server
    #[arg(long, env = "NAMESCOUT_PORT", default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    engine: EngineArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize process ID singleton for webserver
    ProcessId::init_webserver();
    logging::init_tracing(Some(&args.log_level));

    let http_addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", args.host, args.port, e))?;

    let provider = args.engine.provider;
    let config = args.engine.into_config()?;
    let engine = build_engine(provider, config)?;

    logging::log_startup(ProcessId::current(), &format!("HTTP API on {http_addr} ({provider:?} providers)"));

    let webserver = WebServer::new(engine, http_addr);
    webserver.run().await?;

    logging::log_success(ProcessId::current(), "WebServer stopped gracefully");
    Ok(())
}
