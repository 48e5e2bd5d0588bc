//! Fixed-interval replay scheduler for Encore.
//!
//! After a round of submissions, the server replays every submitted
//! imitation to the room, one per fixed interval, then automatically
//! advances to the next round. This crate is that timed sequence as an
//! explicit state machine: the scheduler is armed with an ordered queue of
//! items, yields one [`ReplayStep::Play`] per item, and after the last
//! item yields exactly one [`ReplayStep::AdvanceRound`] a further interval
//! later.
//!
//! Arming with an empty queue leaves the scheduler idle: nothing plays and
//! no round advance ever fires. That gap is inherited game behavior — the
//! round stays open until a player triggers `startRound` by hand.
//!
//! # Integration
//!
//! The scheduler is designed to sit inside a room actor's `tokio::select!`
//! loop. While idle, [`ReplayScheduler::wait_for_step`] pends forever, so
//! the branch is inert until the sequence is armed:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         step = scheduler.wait_for_step() => match step {
//!             ReplayStep::Play(item) => { /* broadcast one imitation */ }
//!             ReplayStep::AdvanceRound => { /* reset round, next media */ }
//!         }
//!     }
//! }
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

/// Time between replay steps. Fixed game pacing, not per-room
/// configuration.
pub const REPLAY_INTERVAL: Duration = Duration::from_secs(8);

/// One step of an armed replay sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStep<T> {
    /// Play this item now.
    Play(T),
    /// The sequence is over: advance the round.
    AdvanceRound,
}

enum State<T> {
    Idle,
    Active {
        queue: VecDeque<T>,
        /// When the next step fires.
        deadline: Instant,
    },
}

/// Drives one room's replay sequence.
///
/// One scheduler per room actor. The sequence runs to completion once
/// armed; [`ReplayScheduler::arm`] during an active sequence is ignored,
/// and only [`ReplayScheduler::cancel`] (room shutdown) stops it early.
pub struct ReplayScheduler<T> {
    interval: Duration,
    state: State<T>,
}

impl<T> ReplayScheduler<T> {
    /// Creates an idle scheduler with the standard [`REPLAY_INTERVAL`].
    pub fn new() -> Self {
        Self::with_interval(REPLAY_INTERVAL)
    }

    /// Creates an idle scheduler with a custom step interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            state: State::Idle,
        }
    }

    /// Loads a sequence of items to replay, first step due immediately.
    ///
    /// An empty `items` leaves the scheduler idle. Arming while a sequence
    /// is active is ignored — the running sequence completes.
    pub fn arm(&mut self, items: Vec<T>) {
        if !self.is_idle() {
            debug!("replay already in progress, ignoring arm");
            return;
        }
        if items.is_empty() {
            debug!("no items to replay, scheduler stays idle");
            return;
        }
        debug!(items = items.len(), "replay sequence armed");
        self.state = State::Active {
            queue: items.into(),
            deadline: Instant::now(),
        };
    }

    /// Drops any pending steps and returns to idle.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!(pending = self.pending(), "replay sequence cancelled");
            self.state = State::Idle;
        }
    }

    /// Whether no sequence is in flight.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Items still queued to play (excluding the terminal round advance).
    pub fn pending(&self) -> usize {
        match &self.state {
            State::Idle => 0,
            State::Active { queue, .. } => queue.len(),
        }
    }

    /// The step interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next step is due and returns it.
    ///
    /// While idle this future pends forever — it will never resolve on its
    /// own, but `tokio::select!` will still process other branches. After
    /// the terminal [`ReplayStep::AdvanceRound`] the scheduler is idle
    /// again.
    pub async fn wait_for_step(&mut self) -> ReplayStep<T> {
        let deadline = match &self.state {
            State::Active { deadline, .. } => *deadline,
            State::Idle => {
                // This future never completes — select! handles other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(deadline).await;

        let State::Active { queue, deadline } = &mut self.state else {
            unreachable!("checked above; wait_for_step holds &mut self");
        };

        match queue.pop_front() {
            Some(item) => {
                // Next step (another item, or the terminal advance) fires
                // one interval after this one.
                *deadline += self.interval;
                ReplayStep::Play(item)
            }
            None => {
                self.state = State::Idle;
                debug!("replay sequence complete, advancing round");
                ReplayStep::AdvanceRound
            }
        }
    }
}

impl<T> Default for ReplayScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
