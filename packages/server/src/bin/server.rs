//! Chat-room relay server.
//!
//! Clients join named rooms, broadcast messages to everyone in the room and
//! receive participant-presence updates.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 3000
//! ROOMCAST_LOG_LEVEL=debug cargo run --bin roomcast-server
//! ```

use std::sync::Arc;

use clap::Parser;
use roomcast_server::ui::Server;
use roomcast_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "WebSocket chat-room relay server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "ROOMCAST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "ROOMCAST_PORT", default_value = "8080")]
    port: u16,

    /// Default log level (overridden by RUST_LOG)
    #[arg(short = 'l', long, env = "ROOMCAST_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &args.log_level);

    let server = Server::in_memory(Arc::new(SystemClock));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
