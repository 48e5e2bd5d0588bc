//! Error types for the room layer.
//!
//! Room lookups return typed errors so callers can decide what a miss
//! means. The connection handler and the room actor both choose the
//! lenient policy: an unknown room or player is a debug-logged no-op,
//! never a failure surfaced to participants.

use encore_protocol::{PlayerName, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The action referenced a room id not in the registry.
    #[error("unknown room: {0}")]
    UnknownRoom(RoomId),

    /// The action referenced a player name with no record in the session.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerName),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
