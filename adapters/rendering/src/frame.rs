//! Event-driven repainting of the canvas layers.

use trailgrid_core::{Event, FovBounds, PixelPoint};
use trailgrid_world::Session;

use crate::{ImageLoader, Layer, MapImage, Painter, Rect, RenderingError, SurfaceSource};

/// Position and animation state of the grid container inside its wrapper.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Offset of the container's top-left corner.
    pub offset: PixelPoint,
    /// Whether offset changes should animate.
    pub transitions_enabled: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: PixelPoint::new(0.0, 0.0),
            transitions_enabled: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum MaskUpdate {
    Unchanged,
    Clear,
    Window(FovBounds),
}

/// Tracks which layers are stale and repaints them on demand.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    painter: Painter,
    map: Option<MapImage>,
    viewport: Viewport,
    primary_stale: bool,
    mask: MaskUpdate,
}

impl FrameRenderer {
    /// Creates a renderer whose first frame repaints the primary layer.
    #[must_use]
    pub fn new(painter: Painter) -> Self {
        Self {
            painter,
            map: None,
            viewport: Viewport::default(),
            primary_stale: true,
            mask: MaskUpdate::Unchanged,
        }
    }

    /// Latest viewport state reported by the session.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Loads the map background drawn beneath the grid.
    pub fn load_map<L>(&mut self, loader: &L, location: &str) -> Result<(), RenderingError>
    where
        L: ImageLoader + ?Sized,
    {
        self.map = Some(loader.load(location)?);
        self.primary_stale = true;
        Ok(())
    }

    /// Whether any layer needs repainting.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.primary_stale || self.mask != MaskUpdate::Unchanged
    }

    /// Folds session events into the pending repaint work.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SessionStarted { .. }
                | Event::MarkersPlaced { .. }
                | Event::PlayerMoved { .. }
                | Event::WalkableChanged { .. }
                | Event::MarkerReached { .. }
                | Event::SessionCleared => self.primary_stale = true,
                Event::VisibilityChanged { bounds } => {
                    self.mask = bounds.map_or(MaskUpdate::Clear, MaskUpdate::Window);
                    self.primary_stale = true;
                }
                Event::ViewportMoved { offset } => self.viewport.offset = *offset,
                Event::ViewportTransitionChanged { enabled } => {
                    self.viewport.transitions_enabled = *enabled;
                }
                Event::IntroFocused { .. }
                | Event::IntroFinished
                | Event::ScoreChanged { .. }
                | Event::DragAttached
                | Event::DragDetached
                | Event::GameCompleted { .. }
                | Event::PastGameCleared => {}
            }
        }
    }

    /// Repaints every stale layer.
    pub fn render<S>(&mut self, source: &mut S, session: &Session) -> Result<(), RenderingError>
    where
        S: SurfaceSource + ?Sized,
    {
        if self.primary_stale {
            let surface = source.acquire(Layer::Primary)?;
            let canvas = Rect::from_size(surface.size());
            surface.clear_rect(canvas);
            if let Some(map) = &self.map {
                self.painter.paint_map(surface, map);
            }
            self.painter.paint_grid(surface);
            self.painter.paint_paths(surface, session);
            self.painter.paint_exits(surface, session);
            self.painter.paint_walkable(surface, session);
            self.painter.paint_markers(surface, session)?;
            self.painter.paint_player(surface, session);
            self.primary_stale = false;
        }

        match self.mask {
            MaskUpdate::Unchanged => {}
            MaskUpdate::Clear => {
                let surface = source.acquire(Layer::Mask)?;
                self.painter.clear_visibility_mask(surface);
            }
            MaskUpdate::Window(bounds) => {
                let surface = source.acquire(Layer::Mask)?;
                self.painter.paint_visibility_mask(surface, bounds);
            }
        }
        self.mask = MaskUpdate::Unchanged;
        Ok(())
    }
}
