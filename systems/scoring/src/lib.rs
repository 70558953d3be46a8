#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score bookkeeping for a single session.

use std::collections::BTreeSet;

use trailgrid_core::{CompletedGame, Marker, MarkerKind, NodeIndex};

/// Points granted when a reward marker is consumed.
pub const REWARD_POINTS: i64 = 100;
/// Points granted (negative) when a penalty marker is consumed.
pub const PENALTY_POINTS: i64 = -50;
/// Points charged for every player-initiated move.
pub const MOVE_POINTS: i64 = -10;

/// Running score, counters, and the set of consumed markers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreTracker {
    starting_score: i64,
    score: i64,
    moves: u32,
    rewards: u32,
    penalties: u32,
    reached: BTreeSet<NodeIndex>,
}

impl ScoreTracker {
    /// Creates a tracker whose score begins at `starting_score`.
    #[must_use]
    pub fn new(starting_score: i64) -> Self {
        Self {
            starting_score,
            score: starting_score,
            moves: 0,
            rewards: 0,
            penalties: 0,
            reached: BTreeSet::new(),
        }
    }

    /// Charges the cost of a player-initiated move.
    pub fn charge_move(&mut self) {
        self.score += MOVE_POINTS;
        self.moves = self.moves.saturating_add(1);
    }

    /// Consumes the marker unless it was consumed before.
    ///
    /// Returns `true` when the marker affected the score.
    pub fn consume(&mut self, marker: Marker) -> bool {
        if !self.reached.insert(marker.node) {
            return false;
        }

        match marker.kind {
            MarkerKind::Reward => {
                self.score += REWARD_POINTS;
                self.rewards = self.rewards.saturating_add(1);
            }
            MarkerKind::Penalty => {
                self.score += PENALTY_POINTS;
                self.penalties = self.penalties.saturating_add(1);
            }
        }
        true
    }

    /// Whether a marker on `node` has already been consumed.
    #[must_use]
    pub fn has_reached(&self, node: NodeIndex) -> bool {
        self.reached.contains(&node)
    }

    /// Nodes whose markers were consumed, in ascending order.
    pub fn reached(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.reached.iter().copied()
    }

    /// Score the session started with.
    #[must_use]
    pub const fn starting_score(&self) -> i64 {
        self.starting_score
    }

    /// Running score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Player-initiated moves so far.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Reward markers consumed so far.
    #[must_use]
    pub const fn rewards(&self) -> u32 {
        self.rewards
    }

    /// Penalty markers consumed so far.
    #[must_use]
    pub const fn penalties(&self) -> u32 {
        self.penalties
    }

    /// Freezes the counters into a completed-game snapshot.
    #[must_use]
    pub const fn complete(&self, seed: u64) -> CompletedGame {
        CompletedGame {
            starting_score: self.starting_score,
            score: self.score,
            rewards: self.rewards,
            penalties: self.penalties,
            moves: self.moves,
            seed,
        }
    }
}
