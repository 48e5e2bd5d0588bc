//! # Encore server
//!
//! WebSocket game server for Encore, a real-time imitation party game.
//! Players join named rooms, record imitations of a media clip, vote on
//! each other's attempts, and watch a timed replay of every submission.
//!
//! The server is a thin shell over the other crates: it scans the media
//! catalog once at startup ([`encore_catalog`]), accepts WebSocket
//! connections, decodes [`encore_protocol`] events, and routes them into
//! per-room actors ([`encore_room`]).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use encore_server::EncoreServer;
//!
//! # async fn run() -> Result<(), encore_server::ServerError> {
//! let server = EncoreServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .media_dir("media")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
mod ws;

pub use error::ServerError;
pub use server::{EncoreServer, EncoreServerBuilder};
pub use ws::TransportError;
