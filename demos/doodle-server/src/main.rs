//! Runnable Doodle server.
//!
//! Listens on `$DOODLE_HOST:$PORT` (default `0.0.0.0:5000`). Log verbosity
//! follows `RUST_LOG`.

use doodle::prelude::*;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Builds the listen address from optional host and port overrides.
///
/// A port that does not parse falls back to the default.
fn bind_addr(host: Option<String>, port: Option<String>) -> String {
    let host = host
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = port
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    format!("{host}:{port}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    doodle::init_tracing();

    let addr = bind_addr(std::env::var("DOODLE_HOST").ok(), std::env::var("PORT").ok());
    tracing::info!(%addr, "starting Doodle server");

    let server = DoodleServer::builder()
        .bind(&addr)
        .lobby_config(LobbyConfig::default())
        .build()
        .await?;

    server.run().await?;
    Ok(())
}
