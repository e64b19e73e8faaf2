//! Terminal client for the pixel canvas.
//!
//! Connects to the canvas server, prints every update and sends placements
//! typed at the prompt. Automatically reconnects on disconnection (max 5
//! attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pixelwall-client -- --user-id alice
//! cargo run --bin pixelwall-client -- -i bob -u ws://127.0.0.1:3000/ws
//! ```

use clap::Parser;

use pixelwall_client::{ClientOptions, run_client};
use pixelwall_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "pixelwall-client")]
#[command(about = "Terminal client for the collaborative pixel canvas", long_about = None)]
struct Args {
    /// User ID sent with every placement
    #[arg(short = 'i', long)]
    user_id: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Cooldown used for the local countdown hint (ms)
    #[arg(long, env = "PIXELWALL_COOLDOWN_MS", default_value_t = 30_000)]
    cooldown_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        user_id: args.user_id,
        cooldown_ms: args.cooldown_ms,
    };
    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
