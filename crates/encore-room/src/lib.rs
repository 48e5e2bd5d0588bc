//! Room session engine for Encore.
//!
//! This is the core of the game server: the state machine that governs a
//! room's life cycle — membership, per-round submission and voting,
//! weighted score aggregation, and the timed replay sequence that advances
//! rounds.
//!
//! Each room runs as an isolated Tokio task (actor model). The actor owns
//! a pure [`Session`] state machine and a replay scheduler, serializing
//! all participant actions and timer-driven transitions through one loop.
//!
//! # Key types
//!
//! - [`Session`] — one room's game state and round rules
//! - [`RoundPhase`] — where a room is in its round cycle
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomRegistry`] — lazily creates rooms, shares the catalog snapshot
//! - [`RoomError`] — typed lookup failures (handled as no-ops upstream)

mod error;
mod registry;
mod room;
mod session;

pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{PlayerSender, RoomHandle, RoomInfo};
pub use session::{Effects, RoundPhase, Session};
