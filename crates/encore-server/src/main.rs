//! Binary entry point.
//!
//! Configuration comes from the environment:
//! - `ENCORE_ADDR` — listen address (default `127.0.0.1:8080`)
//! - `ENCORE_MEDIA_DIR` — media catalog directory (default `media`)
//! - `RUST_LOG` — log filter (default `info`)

use encore_server::{EncoreServer, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("ENCORE_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let media_dir = std::env::var("ENCORE_MEDIA_DIR")
        .unwrap_or_else(|_| "media".to_string());

    let server = EncoreServer::builder()
        .bind(&addr)
        .media_dir(media_dir)
        .build()
        .await?;

    server.run().await
}
