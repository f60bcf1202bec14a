use crate::coords::Bounds;

use super::ScreenMap;

/// Geometry fingerprint used to decide whether cached render resources are stale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeometryVersion {
    pub total_pixels: usize,
    pub bounds: Bounds,
}

impl GeometryVersion {
    /// `None` when the map has no strips.
    pub fn of(screen_map: &ScreenMap) -> Option<Self> {
        Some(Self {
            total_pixels: screen_map.total_pixels(),
            bounds: screen_map.absolute_bounds()?,
        })
    }
}
