//! The room session: one room's pure game state machine.
//!
//! A [`Session`] owns the room's players, catalog snapshot, media pointer,
//! and round phase. Operations mutate state and return the broadcast
//! effects they produced as `(Recipient, ServerEvent)` pairs; the room
//! actor delivers them. Keeping the session free of channels and timers is
//! what makes the round rules directly testable.

use std::sync::Arc;

use encore_protocol::{
    MediaItem, MediaKind, Player, PlayerName, Recipient, RoomId,
    ServerEvent,
};

use crate::RoomError;

/// Broadcast effects produced by a session operation, in delivery order.
pub type Effects = Vec<(Recipient, ServerEvent)>;

// ---------------------------------------------------------------------------
// RoundPhase
// ---------------------------------------------------------------------------

/// Where a room is in its round cycle.
///
/// ```text
/// AwaitingSubmissions → Replaying → RoundEnded → (reset) → AwaitingSubmissions
/// ```
///
/// There is no terminal phase — rooms cycle indefinitely. The phase is
/// tracked and reported but gates nothing: a `submit` or `vote` arriving
/// in any phase still mutates state, matching the game's permissive
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Players are recording and submitting imitations.
    AwaitingSubmissions,
    /// The replay scheduler is playing submissions back.
    Replaying,
    /// Scores are final; waiting for the next round to start.
    RoundEnded,
}

impl RoundPhase {
    pub fn is_awaiting_submissions(&self) -> bool {
        matches!(self, Self::AwaitingSubmissions)
    }

    pub fn is_replaying(&self) -> bool {
        matches!(self, Self::Replaying)
    }

    pub fn is_round_ended(&self) -> bool {
        matches!(self, Self::RoundEnded)
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingSubmissions => write!(f, "AwaitingSubmissions"),
            Self::Replaying => write!(f, "Replaying"),
            Self::RoundEnded => write!(f, "RoundEnded"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One room's game state.
///
/// Players live in a `Vec` in first-seen join order. That order is load-
/// bearing: it decides the replay sequence, the tie-break at round end,
/// and the order of the player list on the wire. A repeat join overwrites
/// the record in place, keeping its position.
pub struct Session {
    id: RoomId,
    /// The first player ever to join. Never reassigned.
    host: Option<PlayerName>,
    catalog: Arc<[MediaItem]>,
    /// Index into `catalog`; always in range while the catalog is
    /// non-empty, meaningless when it is empty.
    current_index: usize,
    players: Vec<Player>,
    phase: RoundPhase,
}

impl Session {
    /// Creates an empty session over a shared catalog snapshot.
    pub fn new(id: RoomId, catalog: Arc<[MediaItem]>) -> Self {
        Self {
            id,
            host: None,
            catalog,
            current_index: 0,
            players: Vec::new(),
            phase: RoundPhase::AwaitingSubmissions,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn host(&self) -> Option<&PlayerName> {
        self.host.as_ref()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn player(&self, name: &PlayerName) -> Option<&Player> {
        self.players.iter().find(|p| &p.name == name)
    }

    fn player_mut(&mut self, name: &PlayerName) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.name == name)
    }

    fn players_event(&self) -> ServerEvent {
        ServerEvent::Players {
            players: self.players.clone(),
        }
    }

    /// Adds a player at its zero state, or re-creates an existing one in
    /// place. The first joiner ever becomes the host. No phase change.
    ///
    /// Effects, in order: catalog to the joiner, current media to the
    /// joiner (skipped when the catalog is empty), players to the room,
    /// host status to the joiner.
    pub fn join(&mut self, name: PlayerName) -> Effects {
        let host = self.host.get_or_insert_with(|| name.clone()).clone();

        let record = Player::new(name.clone());
        match self.player_mut(&name) {
            Some(existing) => *existing = record,
            None => self.players.push(record),
        }

        let mut effects: Effects = Vec::with_capacity(4);
        effects.push((
            Recipient::Player(name.clone()),
            ServerEvent::MediaCatalog {
                items: self.catalog.to_vec(),
            },
        ));
        if let Some(item) = self.catalog.get(self.current_index) {
            effects.push((
                Recipient::Player(name.clone()),
                ServerEvent::CurrentMedia {
                    index: self.current_index,
                    item: item.clone(),
                },
            ));
        }
        effects.push((Recipient::All, self.players_event()));
        effects.push((
            Recipient::Player(name.clone()),
            ServerEvent::HostStatus {
                is_host: name == host,
            },
        ));
        effects
    }

    /// Marks a player's imitation as submitted.
    ///
    /// Not phase-gated: a submission arriving mid-replay or after round
    /// end is still recorded.
    ///
    /// # Errors
    /// `RoomError::UnknownPlayer` if no record exists for `name`.
    pub fn submit(
        &mut self,
        name: &PlayerName,
        media_locator: String,
    ) -> Result<Effects, RoomError> {
        let player = self
            .player_mut(name)
            .ok_or_else(|| RoomError::UnknownPlayer(name.clone()))?;
        player.submitted = true;
        player.submitted_media = Some(media_locator);
        Ok(vec![(Recipient::All, self.players_event())])
    }

    /// Tells every member to play the original media now. Pure broadcast —
    /// a synchronization signal, not state mutation.
    pub fn play_original(
        &self,
        media_locator: String,
        kind: MediaKind,
    ) -> Effects {
        vec![(
            Recipient::All,
            ServerEvent::PlayOriginal {
                media_locator,
                kind,
            },
        )]
    }

    /// Applies a weighted vote from `voter` on `target`.
    ///
    /// Each voter counts at most once per target per round, enforced
    /// solely by the target's recorded voter set: a duplicate vote is a
    /// silent no-op with no broadcast. Weight 2, 1, or −1 moves the
    /// matching counter; any other weight moves nothing but still records
    /// the voter (the vote is burned). The voter is not required to be a
    /// player.
    ///
    /// # Errors
    /// `RoomError::UnknownPlayer` if no record exists for `target`.
    pub fn vote(
        &mut self,
        voter: PlayerName,
        target: &PlayerName,
        weight: i32,
    ) -> Result<Effects, RoomError> {
        let player = self
            .player_mut(target)
            .ok_or_else(|| RoomError::UnknownPlayer(target.clone()))?;

        if player.voted_by.contains(&voter) {
            return Ok(Vec::new());
        }

        match weight {
            2 => player.scores.strong_approvals += 1,
            1 => player.scores.approvals += 1,
            -1 => player.scores.disapprovals += 1,
            _ => {}
        }
        player.voted_by.insert(voter);

        Ok(vec![(Recipient::All, self.players_event())])
    }

    /// Computes net scores, picks the winner, and closes the round.
    ///
    /// The winner is found by a left-to-right strict-maximum scan over the
    /// player list, so a tie goes to the earliest joiner with the maximal
    /// score. An empty room yields no winner.
    pub fn end_round(&mut self) -> Effects {
        let mut winner: Option<PlayerName> = None;
        let mut max_net = i32::MIN;
        for player in &mut self.players {
            let net = player.scores.net();
            player.net_score = Some(net);
            if net > max_net {
                max_net = net;
                winner = Some(player.name.clone());
            }
        }

        self.phase = RoundPhase::RoundEnded;

        vec![(
            Recipient::All,
            ServerEvent::RoundEnded {
                winner,
                players: self.players.clone(),
            },
        )]
    }

    /// Immediate round reset (the inbound `startRound` event).
    ///
    /// Resets every player and announces the new round, but does NOT
    /// advance the media index — that belongs to the replay scheduler's
    /// terminal transition ([`Session::advance_round`]).
    pub fn start_round(&mut self) -> Effects {
        self.reset_players();
        self.phase = RoundPhase::AwaitingSubmissions;
        vec![(Recipient::All, ServerEvent::RoundStarted)]
    }

    /// The scheduler's terminal round advance: next media item, fresh
    /// players, new round.
    ///
    /// The index step and the `currentMedia` broadcast are skipped when
    /// the catalog is empty (the modulo would be undefined); the player
    /// reset and round-started broadcast still happen.
    pub fn advance_round(&mut self) -> Effects {
        let mut effects: Effects = Vec::with_capacity(2);

        if !self.catalog.is_empty() {
            self.current_index =
                (self.current_index + 1) % self.catalog.len();
            effects.push((
                Recipient::All,
                ServerEvent::CurrentMedia {
                    index: self.current_index,
                    item: self.catalog[self.current_index].clone(),
                },
            ));
        }

        self.reset_players();
        self.phase = RoundPhase::AwaitingSubmissions;
        effects.push((Recipient::All, ServerEvent::RoundStarted));
        effects
    }

    /// Collects the replay sequence: `(name, locator)` for every submitted
    /// player, in join order. Enters the `Replaying` phase when there is
    /// anything to play; an empty result leaves the phase untouched.
    pub fn start_replay(&mut self) -> Vec<(PlayerName, String)> {
        let items: Vec<(PlayerName, String)> = self
            .players
            .iter()
            .filter(|p| p.submitted)
            .filter_map(|p| {
                p.submitted_media
                    .as_ref()
                    .map(|m| (p.name.clone(), m.clone()))
            })
            .collect();

        if !items.is_empty() {
            self.phase = RoundPhase::Replaying;
        }
        items
    }

    fn reset_players(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use encore_protocol::Scores;

    use super::*;

    fn catalog(len: usize) -> Arc<[MediaItem]> {
        (0..len)
            .map(|i| MediaItem {
                id: format!("id{i}"),
                title: format!("track{i}"),
                kind: MediaKind::Audio,
                source: format!("/media/track{i}.mp3"),
            })
            .collect()
    }

    fn session(catalog_len: usize) -> Session {
        Session::new("room".into(), catalog(catalog_len))
    }

    /// A session with players a, b, c joined in that order.
    fn session_with_players() -> Session {
        let mut s = session(3);
        for name in ["a", "b", "c"] {
            s.join(name.into());
        }
        s
    }

    fn names_of(players: &[Player]) -> Vec<&str> {
        players.iter().map(|p| p.name.0.as_str()).collect()
    }

    // =====================================================================
    // RoundPhase
    // =====================================================================

    #[test]
    fn test_round_phase_predicates() {
        assert!(RoundPhase::AwaitingSubmissions.is_awaiting_submissions());
        assert!(RoundPhase::Replaying.is_replaying());
        assert!(RoundPhase::RoundEnded.is_round_ended());
        assert!(!RoundPhase::Replaying.is_round_ended());
    }

    #[test]
    fn test_round_phase_display() {
        assert_eq!(
            RoundPhase::AwaitingSubmissions.to_string(),
            "AwaitingSubmissions"
        );
        assert_eq!(RoundPhase::Replaying.to_string(), "Replaying");
    }

    // =====================================================================
    // join
    // =====================================================================

    #[test]
    fn test_first_joiner_becomes_host() {
        let mut s = session(1);
        s.join("alice".into());
        s.join("bob".into());
        assert_eq!(s.host(), Some(&"alice".into()));
    }

    #[test]
    fn test_join_effects_in_order() {
        let mut s = session(2);
        let effects = s.join("alice".into());

        assert_eq!(effects.len(), 4);
        let to_alice = Recipient::Player("alice".into());
        assert!(matches!(
            &effects[0],
            (r, ServerEvent::MediaCatalog { items }) if *r == to_alice && items.len() == 2
        ));
        assert!(matches!(
            &effects[1],
            (r, ServerEvent::CurrentMedia { index: 0, .. }) if *r == to_alice
        ));
        assert!(matches!(
            &effects[2],
            (Recipient::All, ServerEvent::Players { .. })
        ));
        assert!(matches!(
            &effects[3],
            (r, ServerEvent::HostStatus { is_host: true }) if *r == to_alice
        ));
    }

    #[test]
    fn test_second_joiner_is_not_host() {
        let mut s = session(1);
        s.join("alice".into());
        let effects = s.join("bob".into());
        assert!(effects.iter().any(|(r, e)| matches!(
            (r, e),
            (Recipient::Player(p), ServerEvent::HostStatus { is_host: false })
                if p == &PlayerName::from("bob")
        )));
    }

    #[test]
    fn test_join_empty_catalog_skips_current_media() {
        let mut s = session(0);
        let effects = s.join("alice".into());
        assert_eq!(effects.len(), 3);
        assert!(!effects
            .iter()
            .any(|(_, e)| matches!(e, ServerEvent::CurrentMedia { .. })));
    }

    #[test]
    fn test_rejoin_resets_record_but_keeps_position() {
        let mut s = session_with_players();
        s.submit(&"b".into(), "/up/b.webm".into()).unwrap();

        s.join("b".into());

        let b = s.player(&"b".into()).unwrap();
        assert!(!b.submitted);
        assert_eq!(s.player_count(), 3);
        // Still second in join order.
        let (_, ServerEvent::Players { players }) =
            s.join("probe".into()).remove(2)
        else {
            panic!("expected players event");
        };
        assert_eq!(names_of(&players), ["a", "b", "c", "probe"]);
    }

    // =====================================================================
    // submit
    // =====================================================================

    #[test]
    fn test_submit_marks_player() {
        let mut s = session_with_players();
        let effects = s.submit(&"a".into(), "/up/a.webm".into()).unwrap();

        let a = s.player(&"a".into()).unwrap();
        assert!(a.submitted);
        assert_eq!(a.submitted_media.as_deref(), Some("/up/a.webm"));
        assert!(matches!(
            &effects[0],
            (Recipient::All, ServerEvent::Players { .. })
        ));
    }

    #[test]
    fn test_submit_unknown_player_is_error() {
        let mut s = session_with_players();
        let result = s.submit(&"ghost".into(), "/up/g.webm".into());
        assert!(matches!(result, Err(RoomError::UnknownPlayer(_))));
    }

    #[test]
    fn test_submit_is_not_phase_gated() {
        let mut s = session_with_players();
        s.end_round();
        assert!(s.phase().is_round_ended());

        // Still accepted after round end.
        s.submit(&"a".into(), "/up/late.webm".into()).unwrap();
        assert!(s.player(&"a".into()).unwrap().submitted);
        assert!(s.phase().is_round_ended());
    }

    // =====================================================================
    // vote
    // =====================================================================

    #[test]
    fn test_vote_weights_move_matching_counter() {
        let mut s = session_with_players();
        s.vote("v1".into(), &"a".into(), 2).unwrap();
        s.vote("v2".into(), &"a".into(), 1).unwrap();
        s.vote("v3".into(), &"a".into(), -1).unwrap();

        assert_eq!(
            s.player(&"a".into()).unwrap().scores,
            Scores {
                strong_approvals: 1,
                approvals: 1,
                disapprovals: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_vote_counts_once() {
        let mut s = session_with_players();
        s.vote("b".into(), &"a".into(), 2).unwrap();
        let effects = s.vote("b".into(), &"a".into(), 1).unwrap();

        let a = s.player(&"a".into()).unwrap();
        assert_eq!(a.scores.strong_approvals, 1);
        assert_eq!(a.scores.approvals, 0);
        // Silent: no broadcast for the rejected duplicate.
        assert!(effects.is_empty());
    }

    #[test]
    fn test_same_voter_different_targets_both_count() {
        let mut s = session_with_players();
        s.vote("c".into(), &"a".into(), 2).unwrap();
        s.vote("c".into(), &"b".into(), 1).unwrap();

        assert_eq!(s.player(&"a".into()).unwrap().scores.strong_approvals, 1);
        assert_eq!(s.player(&"b".into()).unwrap().scores.approvals, 1);
    }

    #[test]
    fn test_out_of_range_weight_burns_the_vote() {
        let mut s = session_with_players();
        s.vote("b".into(), &"a".into(), 7).unwrap();

        let a = s.player(&"a".into()).unwrap();
        assert_eq!(a.scores, Scores::default());
        // Voter recorded, so a corrected vote no longer counts.
        s.vote("b".into(), &"a".into(), 2).unwrap();
        assert_eq!(
            s.player(&"a".into()).unwrap().scores.strong_approvals,
            0
        );
    }

    #[test]
    fn test_vote_unknown_target_is_error() {
        let mut s = session_with_players();
        let result = s.vote("a".into(), &"ghost".into(), 2);
        assert!(matches!(result, Err(RoomError::UnknownPlayer(_))));
    }

    // =====================================================================
    // end_round
    // =====================================================================

    #[test]
    fn test_end_round_computes_net_scores() {
        let mut s = session_with_players();
        s.vote("v1".into(), &"a".into(), 2).unwrap();
        s.vote("v2".into(), &"a".into(), 2).unwrap();
        s.vote("v3".into(), &"a".into(), 1).unwrap();
        s.vote("v4".into(), &"a".into(), -1).unwrap();

        s.end_round();

        // 2·2 + 1 − 1
        assert_eq!(s.player(&"a".into()).unwrap().net_score, Some(4));
        assert_eq!(s.player(&"b".into()).unwrap().net_score, Some(0));
        assert!(s.phase().is_round_ended());
    }

    #[test]
    fn test_end_round_winner_is_strict_maximum() {
        let mut s = session_with_players();
        s.vote("v1".into(), &"b".into(), 2).unwrap();
        s.vote("v1".into(), &"a".into(), 1).unwrap();

        let effects = s.end_round();
        let (_, ServerEvent::RoundEnded { winner, .. }) = &effects[0]
        else {
            panic!("expected roundEnded");
        };
        assert_eq!(winner, &Some("b".into()));
    }

    #[test]
    fn test_end_round_tie_goes_to_first_joiner() {
        let mut s = session_with_players();
        // b and c tie at net 2; b joined earlier.
        s.vote("v1".into(), &"c".into(), 2).unwrap();
        s.vote("v1".into(), &"b".into(), 2).unwrap();

        let effects = s.end_round();
        let (_, ServerEvent::RoundEnded { winner, .. }) = &effects[0]
        else {
            panic!("expected roundEnded");
        };
        assert_eq!(winner, &Some("b".into()));
    }

    #[test]
    fn test_end_round_all_zero_picks_first_player() {
        let mut s = session_with_players();
        let effects = s.end_round();
        let (_, ServerEvent::RoundEnded { winner, .. }) = &effects[0]
        else {
            panic!("expected roundEnded");
        };
        assert_eq!(winner, &Some("a".into()));
    }

    #[test]
    fn test_end_round_empty_room_has_no_winner() {
        let mut s = session(3);
        let effects = s.end_round();
        let (_, ServerEvent::RoundEnded { winner, players }) = &effects[0]
        else {
            panic!("expected roundEnded");
        };
        assert_eq!(winner, &None);
        assert!(players.is_empty());
    }

    // =====================================================================
    // start_round / advance_round
    // =====================================================================

    #[test]
    fn test_start_round_resets_without_media_advance() {
        let mut s = session_with_players();
        s.submit(&"a".into(), "/up/a.webm".into()).unwrap();
        s.vote("b".into(), &"a".into(), 2).unwrap();
        s.end_round();

        let effects = s.start_round();

        assert!(s.phase().is_awaiting_submissions());
        assert_eq!(s.current_index(), 0);
        let a = s.player(&"a".into()).unwrap();
        assert_eq!(*a, Player::new("a".into()));
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            (Recipient::All, ServerEvent::RoundStarted)
        ));
    }

    #[test]
    fn test_advance_round_steps_media_and_resets() {
        let mut s = session_with_players();
        s.submit(&"a".into(), "/up/a.webm".into()).unwrap();
        s.vote("b".into(), &"a".into(), 2).unwrap();
        s.end_round();

        let effects = s.advance_round();

        assert_eq!(s.current_index(), 1);
        assert!(s.phase().is_awaiting_submissions());
        assert_eq!(
            *s.player(&"a".into()).unwrap(),
            Player::new("a".into())
        );
        assert!(matches!(
            &effects[0],
            (Recipient::All, ServerEvent::CurrentMedia { index: 1, .. })
        ));
        assert!(matches!(
            &effects[1],
            (Recipient::All, ServerEvent::RoundStarted)
        ));
    }

    #[test]
    fn test_advance_round_wraps_modulo_catalog_length() {
        let mut s = session(3);
        for _ in 0..4 {
            s.advance_round();
        }
        // (0 + 4) mod 3
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn test_advance_round_empty_catalog_does_not_crash() {
        let mut s = session(0);
        s.join("alice".into());
        s.submit(&"alice".into(), "/up/a.webm".into()).unwrap();

        let effects = s.advance_round();

        assert_eq!(s.current_index(), 0);
        assert!(!s.player(&"alice".into()).unwrap().submitted);
        // Only the round-started broadcast, no currentMedia.
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            (Recipient::All, ServerEvent::RoundStarted)
        ));
    }

    // =====================================================================
    // start_replay
    // =====================================================================

    #[test]
    fn test_start_replay_collects_submitted_in_join_order() {
        let mut s = session_with_players();
        s.submit(&"c".into(), "/up/c.webm".into()).unwrap();
        s.submit(&"a".into(), "/up/a.webm".into()).unwrap();

        let items = s.start_replay();

        // Join order, not submission order; b never submitted.
        assert_eq!(
            items,
            vec![
                ("a".into(), "/up/a.webm".to_string()),
                ("c".into(), "/up/c.webm".to_string()),
            ]
        );
        assert!(s.phase().is_replaying());
    }

    #[test]
    fn test_start_replay_nothing_submitted_keeps_phase() {
        let mut s = session_with_players();
        let items = s.start_replay();
        assert!(items.is_empty());
        assert!(s.phase().is_awaiting_submissions());
    }
}
