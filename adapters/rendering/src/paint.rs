//! Painters for each visual element of a session.

use glam::DVec2;
use trailgrid_core::{FovBounds, GridLayout, MarkerKind, NodeIndex, NodeLabel, PixelPoint};
use trailgrid_world::{query, Session};

use crate::{Color, MapImage, Rect, RenderingError, RoundedRect, Surface};

/// Colors used by the [`Painter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Cell outlines.
    pub grid_line: Color,
    /// Node index labels.
    pub label: Color,
    /// Fill for drawable path nodes.
    pub path: Color,
    /// Outline for nodes the player can step to.
    pub walkable: Color,
    /// Fill for exit nodes.
    pub exit: Color,
    /// Fill for unreached reward markers.
    pub reward: Color,
    /// Fill for unreached penalty markers.
    pub penalty: Color,
    /// Fill for the player token.
    pub player: Color,
    /// Fill for everything outside the field of view.
    pub mask: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            grid_line: Color::from_rgba_u8(0, 0, 0, 0.75),
            label: Color::from_rgba_u8(0, 0, 0, 0.75),
            path: Color::from_rgba_u8(0, 0, 0, 0.5),
            walkable: Color::from_rgb_u8(250, 204, 21),
            exit: Color::from_rgb_u8(59, 130, 246),
            reward: Color::from_rgb_u8(34, 197, 94),
            penalty: Color::from_rgb_u8(239, 68, 68),
            player: Color::from_rgb_u8(255, 255, 255),
            mask: Color::from_rgba_u8(0, 0, 0, 0.75),
        }
    }
}

/// Draws session state onto surfaces using the grid geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Painter {
    layout: GridLayout,
    palette: Palette,
}

impl Painter {
    /// Creates a painter for `layout`.
    #[must_use]
    pub const fn new(layout: GridLayout, palette: Palette) -> Self {
        Self { layout, palette }
    }

    /// Colors used by this painter.
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Grid geometry used by this painter.
    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Pixel rectangle covered by `node`.
    #[must_use]
    pub fn node_rect(&self, node: NodeIndex) -> Rect {
        let position = self.layout.position(node);
        let size = self.layout.node_size();
        Rect::new(position.x, position.y, size.width, size.height)
    }

    fn node_size(&self) -> DVec2 {
        let size = self.layout.node_size();
        DVec2::new(size.width, size.height)
    }

    /// Draws the map background at the canvas origin.
    pub fn paint_map(&self, surface: &mut dyn Surface, image: &MapImage) {
        surface.draw_image(image, PixelPoint::new(0.0, 0.0));
    }

    /// Outlines every cell and labels it with its node index.
    pub fn paint_grid(&self, surface: &mut dyn Surface) {
        let node = self.node_size();
        for row in 0..self.layout.rows() {
            for column in 0..self.layout.columns() {
                let x = f64::from(column) * node.x;
                let y = f64::from(row) * node.y;
                surface.stroke_rect(Rect::new(x, y, node.x, node.y), self.palette.grid_line);

                let index = row * self.layout.columns() + column + 1;
                surface.fill_text(
                    &index.to_string(),
                    PixelPoint::new(x + node.x / 10.0, y + node.y / 1.5),
                    self.palette.label,
                );
            }
        }
    }

    /// Shades every drawable path node.
    pub fn paint_paths(&self, surface: &mut dyn Surface, session: &Session) {
        for node in &query::config(session).nodes.paths {
            if query::is_drawable_path(session, *node) {
                surface.fill_rect(self.node_rect(*node), self.palette.path);
            }
        }
    }

    /// Fills every exit node.
    pub fn paint_exits(&self, surface: &mut dyn Surface, session: &Session) {
        for position in query::nodes_by_label(session, NodeLabel::Exits) {
            surface.fill_rect(self.node_rect(position.node), self.palette.exit);
        }
    }

    /// Outlines the nodes the player can step to next.
    pub fn paint_walkable(&self, surface: &mut dyn Surface, session: &Session) {
        let Some(state) = query::current(session) else {
            return;
        };
        for node in state.walkable() {
            surface.stroke_rect(self.node_rect(*node).inset(1.0), self.palette.walkable);
        }
    }

    /// Draws unreached markers that lie inside the field of view.
    pub fn paint_markers(
        &self,
        surface: &mut dyn Surface,
        session: &Session,
    ) -> Result<(), RenderingError> {
        let Some(state) = query::current(session) else {
            return Ok(());
        };
        let inset = self.node_size().min_element() / 4.0;

        for marker in state.markers() {
            if query::node_mark(session, marker.node).is_none() {
                continue;
            }
            if !query::is_in_fov(session, marker.node)? {
                continue;
            }
            let color = match marker.kind {
                MarkerKind::Reward => self.palette.reward,
                MarkerKind::Penalty => self.palette.penalty,
            };
            surface.fill_rect(self.node_rect(marker.node).inset(inset), color);
        }
        Ok(())
    }

    /// Draws the player token, if the player is on the grid.
    pub fn paint_player(&self, surface: &mut dyn Surface, session: &Session) {
        let Some(player) = query::current(session).and_then(|state| state.player()) else {
            return;
        };
        let inset = self.node_size().min_element() / 8.0;
        let rect = self.node_rect(player.node).inset(inset);
        let radius = rect.size.min_element() / 2.0;
        surface.fill_rounded_rect(RoundedRect::new(rect, radius), self.palette.player);
    }

    /// Darkens everything outside the field-of-view window.
    pub fn paint_visibility_mask(&self, surface: &mut dyn Surface, bounds: FovBounds) {
        let node = self.node_size();
        let canvas = Rect::from_size(surface.size());
        surface.clear_rect(canvas);

        // a player off the grid can leave top below bottom; the window is then empty
        let span = |start: u32, end: u32| (f64::from(end) - f64::from(start) + 1.0).max(0.0);
        let window = Rect::new(
            (f64::from(bounds.left) - 1.0) * node.x,
            (f64::from(bounds.top) - 1.0) * node.y,
            span(bounds.left, bounds.right) * node.x,
            span(bounds.top, bounds.bottom) * node.y,
        );
        surface.fill_even_odd(canvas, RoundedRect::new(window, node.x), self.palette.mask);
    }

    /// Removes the field-of-view mask.
    pub fn clear_visibility_mask(&self, surface: &mut dyn Surface) {
        let canvas = Rect::from_size(surface.size());
        surface.clear_rect(canvas);
    }
}
