#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Viewport offset management for the grid container.
//!
//! The camera tracks the pixel offset of the grid container inside its visible
//! wrapper. Offsets are always clamped so the grid never exposes empty space
//! beyond its edges. Drag panning consumes normalised [`PointerEvent`] values
//! and moves the grid in whole-cell increments only.

use glam::DVec2;
use trailgrid_core::{Event, GridLayout, PixelPoint, PixelSize, PointerEvent};

/// Source of normalised pointer input, such as a windowing backend or a script.
pub trait PointerSource {
    /// Returns the next pending pointer event, if any.
    fn next_event(&mut self) -> Option<PointerEvent>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragState {
    Detached,
    Idle,
    Dragging { base: DVec2 },
}

/// Maintains the viewport offset and the active drag gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraController {
    grid: DVec2,
    node: DVec2,
    wrapper: Option<DVec2>,
    offset: DVec2,
    drag: DragState,
}

impl CameraController {
    /// Creates a camera for the provided grid layout.
    #[must_use]
    pub fn new(layout: &GridLayout) -> Self {
        Self {
            grid: to_vec(layout.size()),
            node: to_vec(layout.node_size()),
            wrapper: None,
            offset: DVec2::ZERO,
            drag: DragState::Detached,
        }
    }

    /// Records the visible wrapper size.
    pub fn place(&mut self, wrapper: PixelSize) {
        self.wrapper = Some(to_vec(wrapper));
    }

    /// Current offset of the grid container relative to the wrapper.
    #[must_use]
    pub fn offset(&self) -> PixelPoint {
        PixelPoint::new(self.offset.x, self.offset.y)
    }

    /// Centers the node whose top-left corner is `target`, or the whole grid.
    pub fn center(&mut self, target: Option<PixelPoint>, out: &mut Vec<Event>) {
        let Some(wrapper) = self.wrapper else {
            return;
        };

        let desired = match target {
            Some(corner) => wrapper / 2.0 - (DVec2::new(corner.x, corner.y) + self.node / 2.0),
            None => (wrapper - self.grid) / 2.0,
        };
        self.apply_offset(PixelPoint::new(desired.x, desired.y), out);
    }

    /// Moves the grid container to `offset`, clamped to the wrapper.
    ///
    /// Each axis becomes `max(min(0, v), wrapper - grid)`. Offsets are ignored
    /// until the wrapper has been placed.
    pub fn apply_offset(&mut self, offset: PixelPoint, out: &mut Vec<Event>) {
        let Some(wrapper) = self.wrapper else {
            return;
        };

        let lower = wrapper - self.grid;
        self.offset = DVec2::new(
            offset.x.min(0.0).max(lower.x),
            offset.y.min(0.0).max(lower.y),
        );
        out.push(Event::ViewportMoved {
            offset: self.offset(),
        });
    }

    /// Whether drag panning is listening to pointer input.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.drag != DragState::Detached
    }

    /// Whether a drag gesture is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Starts listening to pointer input.
    pub fn attach(&mut self, out: &mut Vec<Event>) {
        if self.is_attached() {
            return;
        }
        self.drag = DragState::Idle;
        out.push(Event::DragAttached);
    }

    /// Stops listening to pointer input, ending any gesture in progress.
    pub fn detach(&mut self, out: &mut Vec<Event>) {
        if !self.is_attached() {
            return;
        }
        self.end_gesture(out);
        self.drag = DragState::Detached;
        out.push(Event::DragDetached);
    }

    /// Feeds a pointer event into the drag gesture.
    ///
    /// A second press while a gesture is active supersedes it by resetting the
    /// base position.
    pub fn handle_pointer(&mut self, event: PointerEvent, out: &mut Vec<Event>) {
        match (self.drag, event) {
            (DragState::Detached, _) => {}
            (DragState::Idle, PointerEvent::Down { position }) => {
                self.drag = DragState::Dragging {
                    base: DVec2::new(position.x, position.y),
                };
                out.push(Event::ViewportTransitionChanged { enabled: false });
            }
            (DragState::Dragging { .. }, PointerEvent::Down { position }) => {
                self.drag = DragState::Dragging {
                    base: DVec2::new(position.x, position.y),
                };
            }
            (DragState::Dragging { base }, PointerEvent::Move { position }) => {
                self.drag_to(base, DVec2::new(position.x, position.y), out);
            }
            (DragState::Dragging { .. }, PointerEvent::Up | PointerEvent::Cancel) => {
                self.end_gesture(out);
            }
            (DragState::Idle, _) => {}
        }
    }

    /// Drains every pending event from `source` into the drag gesture.
    pub fn pump<S>(&mut self, source: &mut S, out: &mut Vec<Event>)
    where
        S: PointerSource + ?Sized,
    {
        while let Some(event) = source.next_event() {
            self.handle_pointer(event, out);
        }
    }

    fn drag_to(&mut self, base: DVec2, position: DVec2, out: &mut Vec<Event>) {
        let delta = position - base;
        let cells = (delta.abs() / self.node).floor() * delta.signum();
        if cells == DVec2::ZERO {
            return;
        }

        let next_base = DVec2::new(
            if cells.x == 0.0 { base.x } else { position.x },
            if cells.y == 0.0 { base.y } else { position.y },
        );
        self.drag = DragState::Dragging { base: next_base };

        let target = self.offset + cells * self.node;
        self.apply_offset(PixelPoint::new(target.x, target.y), out);
    }

    fn end_gesture(&mut self, out: &mut Vec<Event>) {
        if self.is_dragging() {
            self.drag = DragState::Idle;
            out.push(Event::ViewportTransitionChanged { enabled: true });
        }
    }
}

fn to_vec(size: PixelSize) -> DVec2 {
    DVec2::new(size.width, size.height)
}
