//! Map background images read from disk.

use std::path::PathBuf;

use image::ImageReader;
use trailgrid_rendering::{ImageLoader, MapImage, RenderingError};

/// Loads map backgrounds relative to the map file's directory.
///
/// The format is picked from the file extension; PNG and PNM files are decoded.
#[derive(Clone, Debug)]
pub(crate) struct FileImageLoader {
    base: PathBuf,
}

impl FileImageLoader {
    pub(crate) fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, location: &str) -> Result<MapImage, RenderingError> {
        let unavailable = |reason: String| RenderingError::ImageUnavailable {
            location: location.to_owned(),
            reason,
        };
        let reader = ImageReader::open(self.base.join(location))
            .map_err(|error| unavailable(format!("file_open_failed:{error}")))?;
        let decoded = reader
            .decode()
            .map_err(|error| unavailable(format!("decode_failed:{error}")))?;

        let image = decoded.to_rgba8();
        MapImage::new(image.width(), image.height(), image.into_raw())
    }
}
