//! Room registry: the process-wide map from room id to room actor.
//!
//! Rooms are created lazily on first sight of an id and never evicted —
//! registry growth over the process lifetime is accepted, matching the
//! game's no-persistence, no-expiry design. The registry is owned by the
//! server state and passed by reference; there are no globals.

use std::collections::HashMap;
use std::sync::Arc;

use encore_protocol::{MediaItem, RoomId};

use crate::room::spawn_room;
use crate::session::Session;
use crate::{RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates and tracks room actors, sharing one catalog snapshot across
/// all of them.
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomHandle>,
    /// Read-only catalog snapshot every room is created over.
    catalog: Arc<[MediaItem]>,
    channel_size: usize,
}

impl RoomRegistry {
    /// Creates an empty registry over a shared catalog snapshot.
    pub fn new(catalog: Arc<[MediaItem]>) -> Self {
        Self::with_channel_size(catalog, DEFAULT_CHANNEL_SIZE)
    }

    /// As [`RoomRegistry::new`], with a custom actor command channel size.
    pub fn with_channel_size(
        catalog: Arc<[MediaItem]>,
        channel_size: usize,
    ) -> Self {
        Self {
            rooms: HashMap::new(),
            catalog,
            channel_size,
        }
    }

    /// Returns the room for `room_id`, spawning its actor on first sight.
    ///
    /// Room ids are opaque — anything a client sends names a room.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room_id) {
            return handle.clone();
        }

        let session =
            Session::new(room_id.clone(), Arc::clone(&self.catalog));
        let handle = spawn_room(session, self.channel_size);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Looks up an existing room without creating one.
    ///
    /// # Errors
    /// `RoomError::UnknownRoom` if no session exists for `room_id`.
    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::UnknownRoom(room_id.clone()))
    }

    /// Returns the number of rooms created so far.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all room ids.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}
