use std::collections::BTreeMap;

use crate::coords::{Bounds, SurfaceSize, Vec2};

/// Integer strip identifier as reported by the device.
pub type StripId = i32;

/// Declared geometry for one strip.
///
/// `map[i]` is the physical position of pixel `i`; insertion order is the pixel order.
#[derive(Debug, Clone, PartialEq)]
pub struct StripGeometry {
    map: Vec<Vec2>,
    bounds: Bounds,
    diameter: Option<f32>,
}

impl StripGeometry {
    /// Builds geometry from a non-empty map. Returns `None` when `map` is empty.
    pub fn new(map: Vec<Vec2>, diameter: Option<f32>) -> Option<Self> {
        let bounds = Bounds::from_points(&map)?;
        Some(Self { map, bounds, diameter })
    }

    #[inline]
    pub fn map(&self) -> &[Vec2] {
        &self.map
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Declared LED dot diameter in screen-map units; `None` means "infer a default".
    #[inline]
    pub fn diameter(&self) -> Option<f32> {
        self.diameter
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// All declared strips plus their merged bounds.
///
/// `absolute_bounds` is only ever recomputed from scratch by the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenMap {
    pub(super) strips: BTreeMap<StripId, StripGeometry>,
    pub(super) absolute_bounds: Option<Bounds>,
}

impl ScreenMap {
    #[inline]
    pub fn strip(&self, strip_id: StripId) -> Option<&StripGeometry> {
        self.strips.get(&strip_id)
    }

    /// Strips in ascending id order.
    #[inline]
    pub fn strips(&self) -> impl Iterator<Item = (StripId, &StripGeometry)> {
        self.strips.iter().map(|(id, g)| (*id, g))
    }

    #[inline]
    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    /// Component-wise min/max over every strip's bounds; `None` without strips.
    #[inline]
    pub fn absolute_bounds(&self) -> Option<Bounds> {
        self.absolute_bounds
    }

    /// Sum of map lengths over all strips.
    pub fn total_pixels(&self) -> usize {
        self.strips.values().map(StripGeometry::len).sum()
    }

    /// Canvas size needed to hold every mapped pixel: `ceil(max - min) + 1` per axis.
    pub fn raster_size(&self) -> Option<SurfaceSize> {
        let b = self.absolute_bounds?;
        Some(SurfaceSize::new(extent_px(b.width()), extent_px(b.height())))
    }
}

fn extent_px(extent: f32) -> u32 {
    if !extent.is_finite() || extent <= 0.0 {
        return 1;
    }
    (extent.ceil() as u32).saturating_add(1)
}
