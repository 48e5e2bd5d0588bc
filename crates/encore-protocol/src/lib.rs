//! Wire protocol for Encore.
//!
//! This crate defines the "language" that game clients and the server
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`MediaItem`],
//!   [`Player`], etc.) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer knows nothing about connections, rooms, or timing —
//! it only describes the events and the data they carry.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, MediaItem, MediaKind, Player, PlayerName, Recipient,
    RoomId, Scores, ServerEvent,
};
