//! Terminal chat client for the Hiroba chat relay.
//!
//! Joins the room under a display name and sends each entered line as a chat
//! message. Automatically reconnects on disconnection (max 5 attempts with
//! 5 second interval). A rejected name exits immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --name Alice
//! cargo run --bin hiroba-client -- -n Bob -u ws://127.0.0.1:3000/ws
//! HIROBA_NAME=Carol cargo run --bin hiroba-client
//! ```

use clap::Parser;

use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal client for the Hiroba single-room chat", long_about = None)]
struct Args {
    /// Display name (1-20 characters)
    #[arg(short = 'n', long, env = "HIROBA_NAME")]
    name: String,

    /// WebSocket server URL
    #[arg(
        short = 'u',
        long,
        env = "HIROBA_URL",
        default_value = "ws://127.0.0.1:3000/ws"
    )]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = hiroba_client::run_client(args.url, args.name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
