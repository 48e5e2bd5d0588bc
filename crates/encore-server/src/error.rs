//! Unified error type for the Encore server.

use encore_catalog::CatalogError;
use encore_protocol::ProtocolError;
use encore_room::RoomError;

use crate::ws::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, WebSocket handshake).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A catalog scan error.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A room-level error (unknown room, actor gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
