#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic marker placement system.
//!
//! Markers are scattered over path nodes using [`SeededRandom`], a linear
//! congruential generator whose output must match other implementations draw
//! for draw. The same seed and map therefore always yield the same markers.

use std::collections::BTreeSet;

use trailgrid_core::{Marker, MarkerKind, NodeIndex};

/// Modulus of the generator, `2^35 - 31`.
pub const RNG_MODULUS: u64 = 34_359_738_337;
/// Multiplier of the generator.
pub const RNG_MULTIPLIER: u64 = 185_852;

const MIN_MARKERS: f64 = 20.0;
const MARKER_SPREAD: f64 = 40.0;
const PENALTY_CEILING: f64 = 0.35;

/// Seeded Lehmer generator producing floats in `[0, 1)`.
///
/// The state is threaded by value: [`SeededRandom::advance`] returns the next
/// generator alongside the drawn value. The intermediate product stays below
/// `2^53`, so the sequence is exact in 64-bit integer arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    /// Creates a generator whose initial state is `seed mod m`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            state: seed % RNG_MODULUS,
        }
    }

    /// Current internal state.
    #[must_use]
    pub const fn state(&self) -> u64 {
        self.state
    }

    /// Whether the generator is stuck at zero and will only ever yield `0.0`.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.state == 0
    }

    /// Draws the next value, returning the advanced generator with it.
    #[must_use]
    pub fn advance(self) -> (Self, f64) {
        let state = (self.state * RNG_MULTIPLIER) % RNG_MODULUS;
        (Self { state }, state as f64 / RNG_MODULUS as f64)
    }

    /// Draws the next value, advancing the generator in place.
    pub fn next_f64(&mut self) -> f64 {
        let (next, value) = self.advance();
        *self = next;
        value
    }
}

/// Scatters reward and penalty markers over `paths`.
///
/// The marker count is drawn first, then each marker draws its kind before its
/// node. Candidates that are already marked, the start node, or an exit are
/// rejected and redrawn. The count is capped at the number of eligible distinct
/// nodes so the rejection loop always terminates; a degenerate generator places
/// nothing.
pub fn place_markers(
    rng: &mut SeededRandom,
    paths: &[NodeIndex],
    start: NodeIndex,
    exits: &[NodeIndex],
) -> Vec<Marker> {
    if rng.is_degenerate() {
        return Vec::new();
    }

    let excluded = |node: NodeIndex| node == start || exits.contains(&node);
    let eligible = paths
        .iter()
        .copied()
        .filter(|node| !excluded(*node))
        .collect::<BTreeSet<_>>()
        .len();

    let drawn = (MIN_MARKERS + rng.next_f64() * MARKER_SPREAD).floor() as usize;
    let count = drawn.min(eligible);

    let mut taken = BTreeSet::new();
    let mut markers = Vec::with_capacity(count);
    for _ in 0..count {
        let kind = if rng.next_f64() > PENALTY_CEILING {
            MarkerKind::Reward
        } else {
            MarkerKind::Penalty
        };

        let node = loop {
            let index = (rng.next_f64() * paths.len() as f64).floor() as usize;
            let candidate = paths[index];
            if !taken.contains(&candidate) && !excluded(candidate) {
                break candidate;
            }
        };

        let _ = taken.insert(node);
        markers.push(Marker::new(node, kind));
    }
    markers
}
