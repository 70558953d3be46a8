//! Exit tour shown before play begins.

use std::time::Duration;

use trailgrid_core::NodeIndex;

/// Progress reported while the tour advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum IntroStep {
    /// The viewport should show this exit next.
    Focus(NodeIndex),
    /// The pause after the last exit elapsed.
    Finished,
}

/// Visits each exit in turn, holding on every one for `pause`.
///
/// The tour lives inside the session state, so dropping that state cancels
/// every step that has not happened yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IntroTour {
    exits: Vec<NodeIndex>,
    current: usize,
    pause: Duration,
    elapsed: Duration,
    finished: bool,
}

impl IntroTour {
    /// Creates a tour over `exits`; the first exit is focused immediately.
    pub(crate) fn new(exits: Vec<NodeIndex>, pause: Duration) -> Self {
        Self {
            exits,
            current: 0,
            pause,
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Exit focused when the tour begins.
    pub(crate) fn first(&self) -> Option<NodeIndex> {
        self.exits.first().copied()
    }

    /// Accumulates `dt` and reports every step whose pause elapsed.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<IntroStep> {
        let mut steps = Vec::new();
        self.elapsed = self.elapsed.saturating_add(dt);

        while !self.finished && self.elapsed >= self.pause {
            self.elapsed -= self.pause;
            self.current += 1;
            match self.exits.get(self.current) {
                Some(&node) => steps.push(IntroStep::Focus(node)),
                None => {
                    self.finished = true;
                    steps.push(IntroStep::Finished);
                }
            }
        }
        steps
    }
}
