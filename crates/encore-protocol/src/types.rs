//! Core protocol types for Encore's wire format.
//!
//! Everything that travels between the server and a connected player is
//! defined here: identifiers, the media/player data model, and the two
//! event enums ([`ClientEvent`] inbound, [`ServerEvent`] outbound).
//!
//! Events are internally tagged JSON objects. The `type` field carries the
//! event name (`"join"`, `"vote"`, `"roundStarted"`, ...) and the remaining
//! fields are the payload in snake_case. Client SDKs match on the tag.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A room identifier.
///
/// Room ids are opaque strings chosen by clients (usually the URL path the
/// players share). The server never validates them — any string names a
/// room, and the first `join` for an unseen id creates it.
///
/// `#[serde(transparent)]` serializes this as the bare string, so
/// `RoomId("lobby")` is just `"lobby"` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A player's display name.
///
/// The name IS the player's identity within a room: the player map is keyed
/// by it, votes reference it, and a second `join` with the same name takes
/// over the existing record. Uniqueness is scoped to one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(pub String);

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlayerName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Media model
// ---------------------------------------------------------------------------

/// Whether a media item is played as audio or video.
///
/// Lowercase on the wire: `"audio"` / `"video"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// One playable item from the media catalog.
///
/// Built once at catalog scan time and immutable afterwards. The `id` is
/// generated at scan time; `title` is derived from the source file name;
/// `source` is the locator clients fetch the media from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub title: String,
    pub kind: MediaKind,
    pub source: String,
}

// ---------------------------------------------------------------------------
// Player model
// ---------------------------------------------------------------------------

/// The three weighted-vote counters on a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    /// Votes with weight +2.
    pub strong_approvals: u32,
    /// Votes with weight +1.
    pub approvals: u32,
    /// Votes with weight −1.
    pub disapprovals: u32,
}

impl Scores {
    /// The weighted aggregate: `2·strong_approvals + approvals − disapprovals`.
    pub fn net(&self) -> i32 {
        2 * self.strong_approvals as i32 + self.approvals as i32
            - self.disapprovals as i32
    }
}

/// One player's per-round state.
///
/// Created at its zero state on join and reset to that same zero state at
/// the start of every round. `voted_by` records who has already voted for
/// this player this round — the sole enforcement of at-most-one-vote-per-
/// voter-per-target. `net_score` is transient: computed at round end,
/// cleared on reset, and omitted from the wire while unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: PlayerName,
    pub submitted: bool,
    pub submitted_media: Option<String>,
    pub scores: Scores,
    pub voted_by: HashSet<PlayerName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_score: Option<i32>,
}

impl Player {
    /// Creates a player at its zero state.
    pub fn new(name: PlayerName) -> Self {
        Self {
            name,
            submitted: false,
            submitted_media: None,
            scores: Scores::default(),
            voted_by: HashSet::new(),
            net_score: None,
        }
    }

    /// Returns the player to its zero state for a new round.
    pub fn reset(&mut self) {
        self.submitted = false;
        self.submitted_media = None;
        self.scores = Scores::default();
        self.voted_by.clear();
        self.net_score = None;
    }
}

// ---------------------------------------------------------------------------
// Recipient — who should receive an event?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server event.
///
/// Room operations return `(Recipient, ServerEvent)` pairs; the room actor
/// delivers each event to the addressed member(s). This never travels on
/// the wire — it is addressing for the broadcast gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every member of the room.
    All,
    /// One specific member, by name.
    Player(PlayerName),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events a client sends to the server.
///
/// The tags are the game's inbound event names. Vote weights are carried as
/// raw integers — the protocol does not validate them (an out-of-range
/// weight is accepted and simply moves no counter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Enter a room (creating it if it does not exist yet).
    #[serde(rename = "join")]
    Join { room: RoomId, name: PlayerName },

    /// Submit an imitation recording for the current round.
    #[serde(rename = "submit")]
    Submit {
        name: PlayerName,
        media_locator: String,
    },

    /// Ask the server to play the original media for everyone.
    #[serde(rename = "playOriginal")]
    PlayOriginal {
        media_locator: String,
        kind: MediaKind,
    },

    /// Cast a weighted vote (+2, +1, or −1) on another player.
    #[serde(rename = "vote")]
    Vote {
        voter_name: PlayerName,
        target_name: PlayerName,
        weight: i32,
    },

    /// Close voting: compute net scores and announce the winner.
    #[serde(rename = "endRound")]
    EndRound,

    /// Start the timed replay of every submitted imitation.
    #[serde(rename = "playAllImitations")]
    PlayAllImitations,

    /// Reset the round immediately, bypassing the replay sequence.
    #[serde(rename = "startRound")]
    StartRound,
}

/// Events the server publishes to room members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The room's full media catalog. Sent to a joiner only.
    #[serde(rename = "mediaCatalog")]
    MediaCatalog { items: Vec<MediaItem> },

    /// The media item the current round is played against.
    #[serde(rename = "currentMedia")]
    CurrentMedia { index: usize, item: MediaItem },

    /// The full player list, in first-seen join order. Sent after any
    /// player-state mutation.
    #[serde(rename = "players")]
    Players { players: Vec<Player> },

    /// Whether the receiving player is the room's host. Sent to a joiner only.
    #[serde(rename = "hostStatus")]
    HostStatus { is_host: bool },

    /// Round results: the winner (if any player exists) and final scores.
    #[serde(rename = "roundEnded")]
    RoundEnded {
        winner: Option<PlayerName>,
        players: Vec<Player>,
    },

    /// Play one player's imitation now. One per replay step.
    #[serde(rename = "playOneImitation")]
    PlayOneImitation {
        name: PlayerName,
        media_locator: String,
    },

    /// A new round has begun; clients reset their local round state.
    #[serde(rename = "roundStarted")]
    RoundStarted,

    /// Play the original media now (the broadcast half of the inbound
    /// `playOriginal`).
    #[serde(rename = "playOriginal")]
    PlayOriginal {
        media_locator: String,
        kind: MediaKind,
    },
}

// =========================================================================
// Tests
// =========================================================================
