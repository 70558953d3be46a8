//! Character-grid surfaces with one cell per grid node.

use glam::DVec2;
use trailgrid_core::{GridLayout, PixelPoint, PixelSize};
use trailgrid_rendering::{
    Color, Layer, MapImage, Palette, Rect, RenderingError, RoundedRect, Surface, SurfaceSource,
    Viewport,
};

const BLANK: char = ' ';
const FOG: char = '░';
const DARK_MAP: char = '%';

/// Surface that records fills as glyphs and the mask as shaded cells.
#[derive(Clone, Debug)]
pub(crate) struct TextCanvas {
    size: PixelSize,
    cell: DVec2,
    columns: usize,
    rows: usize,
    glyphs: Vec<(Color, char)>,
    cells: Vec<char>,
    shaded: Vec<bool>,
}

impl TextCanvas {
    fn new(layout: &GridLayout, glyphs: Vec<(Color, char)>) -> Self {
        let node = layout.node_size();
        let columns = layout.columns() as usize;
        let rows = layout.rows() as usize;
        Self {
            size: layout.size(),
            cell: DVec2::new(node.width, node.height),
            columns,
            rows,
            glyphs,
            cells: vec![BLANK; columns * rows],
            shaded: vec![false; columns * rows],
        }
    }

    fn glyph(&self, color: Color) -> Option<char> {
        self.glyphs
            .iter()
            .find(|(candidate, _)| *candidate == color)
            .map(|(_, glyph)| *glyph)
    }

    fn centre(&self, index: usize) -> DVec2 {
        let column = (index % self.columns) as f64;
        let row = (index / self.columns) as f64;
        DVec2::new(column + 0.5, row + 0.5) * self.cell
    }

    fn covered(&self, rect: Rect) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|index| rect.contains(self.centre(*index)))
            .collect()
    }

    fn paint(&mut self, rect: Rect, color: Color) {
        let Some(glyph) = self.glyph(color) else {
            return;
        };
        for index in self.covered(rect) {
            self.cells[index] = glyph;
        }
    }
}

impl Surface for TextCanvas {
    fn size(&self) -> PixelSize {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect) {
        for index in self.covered(rect) {
            self.cells[index] = BLANK;
            self.shaded[index] = false;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.paint(rect, color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        // cell borders are implicit in a character grid; only highlighted outlines show
        self.paint(rect, color);
    }

    fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Color) {
        self.paint(shape.rect, color);
    }

    fn fill_even_odd(&mut self, outer: Rect, hole: RoundedRect, _color: Color) {
        for index in 0..self.cells.len() {
            let centre = self.centre(index);
            self.shaded[index] = outer.contains(centre) && !hole.rect.contains(centre);
        }
    }

    fn draw_image(&mut self, image: &MapImage, origin: PixelPoint) {
        let scale = DVec2::new(
            f64::from(image.width()) / self.size.width,
            f64::from(image.height()) / self.size.height,
        );
        for index in 0..self.cells.len() {
            let sample = (self.centre(index) - DVec2::new(origin.x, origin.y)) * scale;
            if sample.x < 0.0 || sample.y < 0.0 {
                continue;
            }
            let dark = image
                .pixel(sample.x as u32, sample.y as u32)
                .is_some_and(|color| color.alpha > 0.0 && color.luminance() < 0.35);
            if dark {
                self.cells[index] = DARK_MAP;
            }
        }
    }

    fn fill_text(&mut self, _text: &str, _origin: PixelPoint, _color: Color) {}
}

/// Primary and mask canvases for one session.
#[derive(Clone, Debug)]
pub(crate) struct TextLayers {
    primary: TextCanvas,
    mask: TextCanvas,
}

impl TextLayers {
    pub(crate) fn new(layout: &GridLayout, palette: &Palette) -> Self {
        let glyphs = vec![
            (palette.path, '.'),
            (palette.walkable, '+'),
            (palette.exit, 'E'),
            (palette.reward, '$'),
            (palette.penalty, '!'),
            (palette.player, '@'),
        ];
        Self {
            primary: TextCanvas::new(layout, glyphs),
            mask: TextCanvas::new(layout, Vec::new()),
        }
    }

    /// Renders the part of the grid visible through `wrapper` at the viewport offset.
    pub(crate) fn compose(&self, viewport: Viewport, wrapper: PixelSize) -> String {
        let canvas = &self.primary;
        let first = |offset: f64, cell: f64, limit: usize| {
            ((-offset / cell).floor().max(0.0) as usize).min(limit)
        };
        let span = |extent: f64, cell: f64| (extent / cell).ceil().max(1.0) as usize;

        let left = first(viewport.offset.x, canvas.cell.x, canvas.columns);
        let top = first(viewport.offset.y, canvas.cell.y, canvas.rows);
        let right = (left + span(wrapper.width, canvas.cell.x)).min(canvas.columns);
        let bottom = (top + span(wrapper.height, canvas.cell.y)).min(canvas.rows);

        let mut frame = String::new();
        for row in top..bottom {
            for column in left..right {
                let index = row * canvas.columns + column;
                frame.push(if self.mask.shaded[index] {
                    FOG
                } else {
                    canvas.cells[index]
                });
            }
            frame.push('\n');
        }
        frame
    }
}

impl SurfaceSource for TextLayers {
    fn acquire(&mut self, layer: Layer) -> Result<&mut dyn Surface, RenderingError> {
        let canvas = match layer {
            Layer::Primary => &mut self.primary,
            Layer::Mask => &mut self.mask,
        };
        if canvas.cells.is_empty() {
            return Err(RenderingError::SurfaceUnavailable { layer });
        }
        Ok(canvas)
    }
}
