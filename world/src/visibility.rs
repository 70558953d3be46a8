//! Rectangular field-of-view window around the player.

use trailgrid_core::{FovBounds, FovExtent, GridLayout, NodeLocation};

/// Visible window centred on `location`, clipped to `[0, rows]` and `[0, cols]`.
pub(crate) fn bounds(layout: &GridLayout, extent: FovExtent, location: NodeLocation) -> FovBounds {
    FovBounds {
        top: location.row().saturating_sub(extent.rows),
        bottom: location.row().saturating_add(extent.rows).min(layout.rows()),
        left: location.column().saturating_sub(extent.cols),
        right: location
            .column()
            .saturating_add(extent.cols)
            .min(layout.columns()),
    }
}
