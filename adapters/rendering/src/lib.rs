#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Trailgrid adapters.
//!
//! Adapters provide [`Surface`] implementations for their canvas layers and an
//! [`ImageLoader`] for the map background. The [`Painter`] draws the grid,
//! paths, markers, player and visibility mask through those surfaces, and the
//! [`FrameRenderer`] decides which layers need repainting from the session's
//! event stream.

mod frame;
mod paint;

pub use frame::{FrameRenderer, Viewport};
pub use paint::{Painter, Palette};

use glam::DVec2;
use thiserror::Error;
use trailgrid_core::{PixelPoint, PixelSize};
use trailgrid_world::SessionError;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 1.0)
    }

    /// Creates a color from byte RGB values and a fractional alpha.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: f32) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha,
        }
    }

    /// Relative luminance of the color, ignoring alpha.
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.2126 * self.red + 0.7152 * self.green + 0.0722 * self.blue
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub origin: DVec2,
    /// Width and height.
    pub size: DVec2,
}

impl Rect {
    /// Creates a rectangle from its corner and extent.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    /// Rectangle covering a whole canvas of the provided size.
    #[must_use]
    pub const fn from_size(size: PixelSize) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Whether `point` lies inside the rectangle, including its top and left edges.
    #[must_use]
    pub fn contains(&self, point: DVec2) -> bool {
        let end = self.origin + self.size;
        point.x >= self.origin.x && point.y >= self.origin.y && point.x < end.x && point.y < end.y
    }

    /// Shrinks the rectangle by `amount` on every side, never below zero size.
    #[must_use]
    pub fn inset(self, amount: f64) -> Self {
        let size = (self.size - DVec2::splat(amount * 2.0)).max(DVec2::ZERO);
        Self {
            origin: self.origin + DVec2::splat(amount),
            size,
        }
    }
}

/// Rectangle with uniformly rounded corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundedRect {
    /// Bounding rectangle.
    pub rect: Rect,
    /// Corner radius in pixels.
    pub radius: f64,
}

impl RoundedRect {
    /// Creates a rounded rectangle.
    #[must_use]
    pub const fn new(rect: Rect, radius: f64) -> Self {
        Self { rect, radius }
    }
}

/// Decoded map background in row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl MapImage {
    /// Wraps decoded pixels, verifying the buffer matches the dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, RenderingError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderingError::MalformedImage {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Color of the pixel at `(x, y)`, if inside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let texel = self.rgba.get(start..start + 4)?;
        Some(Color::from_rgba_u8(
            texel[0],
            texel[1],
            texel[2],
            f32::from(texel[3]) / 255.0,
        ))
    }
}

/// Canvas layer an adapter must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Map, grid, paths, markers and player.
    Primary,
    /// Field-of-view mask drawn over the primary layer.
    Mask,
}

/// Pixel canvas drawing operations.
pub trait Surface {
    /// Size of the canvas in pixels.
    fn size(&self) -> PixelSize;

    /// Resets every pixel inside `rect` to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Fills `rect` with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Outlines `rect` with `color`.
    fn stroke_rect(&mut self, rect: Rect, color: Color);

    /// Fills a rounded rectangle with `color`.
    fn fill_rounded_rect(&mut self, shape: RoundedRect, color: Color);

    /// Fills `outer` minus `hole` using the even-odd rule.
    fn fill_even_odd(&mut self, outer: Rect, hole: RoundedRect, color: Color);

    /// Draws `image` with its top-left corner at `origin`.
    fn draw_image(&mut self, image: &MapImage, origin: PixelPoint);

    /// Draws `text` with its baseline starting at `origin`.
    fn fill_text(&mut self, text: &str, origin: PixelPoint, color: Color);
}

/// Hands out the surfaces backing each canvas layer.
pub trait SurfaceSource {
    /// Returns the surface for `layer`, failing when the canvas is unavailable.
    fn acquire(&mut self, layer: Layer) -> Result<&mut dyn Surface, RenderingError>;
}

/// Resolves a map image reference into decoded pixels.
pub trait ImageLoader {
    /// Loads the image identified by `location`.
    fn load(&self, location: &str) -> Result<MapImage, RenderingError>;
}

/// Errors that can occur while preparing or drawing frames.
#[derive(Debug, Error)]
pub enum RenderingError {
    /// The adapter could not provide a drawing surface.
    #[error("could not acquire a drawing surface for the {layer:?} layer")]
    SurfaceUnavailable {
        /// Layer that was requested.
        layer: Layer,
    },
    /// The map image could not be loaded.
    #[error("map image {location} is unavailable: {reason}")]
    ImageUnavailable {
        /// Location passed to the loader.
        location: String,
        /// Loader-specific failure description.
        reason: String,
    },
    /// Decoded pixels do not match the declared dimensions.
    #[error("map image holds {actual} bytes, expected {expected}")]
    MalformedImage {
        /// Byte count implied by the dimensions.
        expected: usize,
        /// Byte count supplied.
        actual: usize,
    },
    /// A session query failed while drawing.
    #[error(transparent)]
    Session(#[from] SessionError),
}
