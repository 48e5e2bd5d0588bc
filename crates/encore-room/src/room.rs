//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task, communicating with connection handlers
//! through an mpsc channel. The task owns the [`Session`], the replay
//! scheduler, and the per-player outbound senders, so every participant
//! action AND every scheduler-driven transition is serialized through one
//! `tokio::select!` loop — a replay step can never interleave with a vote
//! or a join. Different rooms share nothing and run fully in parallel.

use std::collections::HashMap;

use encore_protocol::{
    MediaKind, PlayerName, Recipient, RoomId, ServerEvent,
};
use encore_replay::{ReplayScheduler, ReplayStep};
use tokio::sync::{mpsc, oneshot};

use crate::session::{Effects, RoundPhase, Session};
use crate::RoomError;

/// Channel sender for delivering server events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Game commands are fire-and-forget: the no-op-on-miss policy means a
/// caller never learns whether a `vote` referenced a real player, only
/// whether the room itself was reachable. `Info` is the one
/// request/response command, for diagnostics and tests.
pub(crate) enum RoomCommand {
    Join {
        name: PlayerName,
        sender: PlayerSender,
    },
    Submit {
        name: PlayerName,
        media_locator: String,
    },
    PlayOriginal {
        media_locator: String,
        kind: MediaKind,
    },
    Vote {
        voter_name: PlayerName,
        target_name: PlayerName,
        weight: i32,
    },
    EndRound,
    PlayAll,
    StartRound,
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
    Shutdown,
}

/// A snapshot of room metadata (not the full game state).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: RoundPhase,
    pub player_count: usize,
    pub current_index: usize,
    pub catalog_len: usize,
    pub host: Option<PlayerName>,
}

/// Handle to a running room actor. Cheap to clone — just an
/// `mpsc::Sender` wrapper. The registry holds one per room.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Adds (or re-adds) a player, wiring up their outbound channel.
    pub async fn join(
        &self,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Join { name, sender }).await
    }

    /// Records a player's imitation submission.
    pub async fn submit(
        &self,
        name: PlayerName,
        media_locator: String,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Submit {
            name,
            media_locator,
        })
        .await
    }

    /// Broadcasts a synchronized "play the original" signal.
    pub async fn play_original(
        &self,
        media_locator: String,
        kind: MediaKind,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::PlayOriginal {
            media_locator,
            kind,
        })
        .await
    }

    /// Casts a weighted vote.
    pub async fn vote(
        &self,
        voter_name: PlayerName,
        target_name: PlayerName,
        weight: i32,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Vote {
            voter_name,
            target_name,
            weight,
        })
        .await
    }

    /// Closes voting and announces the winner.
    pub async fn end_round(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::EndRound).await
    }

    /// Starts the timed replay of all submissions.
    pub async fn play_all(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::PlayAll).await
    }

    /// Resets the round immediately, bypassing the replay sequence.
    pub async fn start_round(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::StartRound).await
    }

    /// Requests a metadata snapshot of the room.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Stops the actor, cancelling any in-flight replay sequence.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    session: Session,
    scheduler: ReplayScheduler<(PlayerName, String)>,
    /// Per-player outbound channels. A rejoin replaces the sender, so the
    /// newest connection for a name receives that player's events.
    senders: HashMap<PlayerName, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.session.id(), "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    // All handles dropped; nothing can reach this room.
                    None => break,
                },
                step = self.scheduler.wait_for_step() => {
                    self.handle_step(step);
                }
            }
        }

        tracing::info!(room_id = %self.session.id(), "room actor stopped");
    }

    /// Processes one command. Returns `true` on shutdown.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join { name, sender } => {
                // Insert before dispatch so the joiner receives the
                // players broadcast too. Last connection wins the record.
                self.senders.insert(name.clone(), sender);
                tracing::info!(
                    room_id = %self.session.id(),
                    player = %name,
                    players = self.senders.len(),
                    "player joined"
                );
                let effects = self.session.join(name);
                self.dispatch(effects);
            }
            RoomCommand::Submit {
                name,
                media_locator,
            } => match self.session.submit(&name, media_locator) {
                Ok(effects) => self.dispatch(effects),
                Err(e) => tracing::debug!(
                    room_id = %self.session.id(),
                    error = %e,
                    "submit ignored"
                ),
            },
            RoomCommand::PlayOriginal {
                media_locator,
                kind,
            } => {
                let effects =
                    self.session.play_original(media_locator, kind);
                self.dispatch(effects);
            }
            RoomCommand::Vote {
                voter_name,
                target_name,
                weight,
            } => match self.session.vote(voter_name, &target_name, weight)
            {
                Ok(effects) => self.dispatch(effects),
                Err(e) => tracing::debug!(
                    room_id = %self.session.id(),
                    error = %e,
                    "vote ignored"
                ),
            },
            RoomCommand::EndRound => {
                let effects = self.session.end_round();
                self.dispatch(effects);
            }
            RoomCommand::PlayAll => {
                let items = self.session.start_replay();
                if items.is_empty() {
                    // Inherited gap: with no submissions, nothing plays
                    // and no auto-advance ever fires.
                    tracing::debug!(
                        room_id = %self.session.id(),
                        "no submissions, replay not started"
                    );
                } else {
                    tracing::info!(
                        room_id = %self.session.id(),
                        items = items.len(),
                        "replay sequence starting"
                    );
                    self.scheduler.arm(items);
                }
            }
            RoomCommand::StartRound => {
                let effects = self.session.start_round();
                self.dispatch(effects);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(
                    room_id = %self.session.id(),
                    "room shutting down"
                );
                self.scheduler.cancel();
                return true;
            }
        }
        false
    }

    fn handle_step(&mut self, step: ReplayStep<(PlayerName, String)>) {
        match step {
            ReplayStep::Play((name, media_locator)) => {
                self.dispatch(vec![(
                    Recipient::All,
                    ServerEvent::PlayOneImitation {
                        name,
                        media_locator,
                    },
                )]);
            }
            ReplayStep::AdvanceRound => {
                let effects = self.session.advance_round();
                self.dispatch(effects);
            }
        }
    }

    /// Delivers effects to the addressed members.
    fn dispatch(&self, effects: Effects) {
        for (recipient, event) in effects {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(event.clone());
                    }
                }
                Recipient::Player(name) => self.send_to(&name, event),
            }
        }
    }

    /// Sends an event to a single member. Silently drops if the receiver
    /// is gone (player disconnected).
    fn send_to(&self, name: &PlayerName, event: ServerEvent) {
        if let Some(sender) = self.senders.get(name) {
            let _ = sender.send(event);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.session.id().clone(),
            phase: self.session.phase(),
            player_count: self.session.player_count(),
            current_index: self.session.current_index(),
            catalog_len: self.session.catalog_len(),
            host: self.session.host().cloned(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel — if it fills, senders wait.
pub(crate) fn spawn_room(session: Session, channel_size: usize) -> RoomHandle {
    let room_id = session.id().clone();
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session,
        scheduler: ReplayScheduler::new(),
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
