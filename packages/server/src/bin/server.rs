//! Parlor chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000 --room-ttl-secs 60
//! ```
//!
//! Every flag can also be set through its `PARLOR_*` environment variable.

use std::time::Duration;

use clap::Parser;
use parlor_server::{
    config::{
        DEFAULT_AUTH_TIMEOUT_SECS, DEFAULT_HISTORY_LIMIT, DEFAULT_HOST, DEFAULT_PORT,
        DEFAULT_ROOM_TTL_SECS, DEFAULT_SWEEP_INTERVAL_SECS, ServerConfig,
    },
    ui::Server,
};
use parlor_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "Room-based WebSocket chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "PARLOR_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PARLOR_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seconds a new connection has to authenticate
    #[arg(long, env = "PARLOR_AUTH_TIMEOUT_SECS", default_value_t = DEFAULT_AUTH_TIMEOUT_SECS)]
    auth_timeout_secs: u64,

    /// Seconds between inactivity sweeps
    #[arg(long, env = "PARLOR_SWEEP_INTERVAL_SECS", default_value_t = DEFAULT_SWEEP_INTERVAL_SECS)]
    sweep_interval_secs: u64,

    /// Seconds of inactivity after which a room is archived
    #[arg(long, env = "PARLOR_ROOM_TTL_SECS", default_value_t = DEFAULT_ROOM_TTL_SECS)]
    room_ttl_secs: u64,

    /// Number of recent messages sent to a client joining a room
    #[arg(long, env = "PARLOR_HISTORY_LIMIT", default_value_t = DEFAULT_HISTORY_LIMIT)]
    history_limit: usize,

    /// Joining a room leaves every other room first
    #[arg(long, env = "PARLOR_EXCLUSIVE_ROOMS")]
    exclusive_rooms: bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, env = "PARLOR_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            auth_timeout: Duration::from_secs(args.auth_timeout_secs),
            sweep_interval: Duration::from_secs(args.sweep_interval_secs),
            room_ttl: Duration::from_secs(args.room_ttl_secs),
            history_limit: args.history_limit,
            exclusive_rooms: args.exclusive_rooms,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &args.log_level);

    let config = ServerConfig::from(args);
    tracing::debug!("Configuration: {:?}", config);

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
