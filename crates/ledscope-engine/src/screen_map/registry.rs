use crate::coords::{Bounds, SurfaceSize, Vec2};
use crate::error::{CompositeError, CompositeResult};

use super::{GeometryVersion, ScreenMap, StripGeometry, StripId};

/// Accumulates strip geometry declarations into one [`ScreenMap`].
///
/// A strip id may be redeclared at any time (e.g. after a topology change); the
/// absolute bounds are rebuilt from every stored strip after each declaration.
#[derive(Debug, Default)]
pub struct ScreenMapRegistry {
    map: ScreenMap,
}

impl ScreenMapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores (or replaces) the geometry of `strip_id`.
    ///
    /// Fails with `InvalidGeometry` when `map` is empty; the previous geometry of the
    /// strip, if any, is left untouched in that case.
    pub fn declare_strip(
        &mut self,
        strip_id: StripId,
        map: Vec<Vec2>,
        diameter: Option<f32>,
    ) -> CompositeResult<()> {
        let geometry =
            StripGeometry::new(map, diameter).ok_or(CompositeError::InvalidGeometry { strip_id })?;

        log::debug!(
            "strip {strip_id}: declared {} pixels, bounds {:?}, diameter {:?}",
            geometry.len(),
            geometry.bounds(),
            geometry.diameter()
        );

        self.map.strips.insert(strip_id, geometry);
        self.recompute_absolute_bounds()?;
        Ok(())
    }

    /// Rebuilds the absolute bounds from scratch over all strips.
    pub fn recompute_absolute_bounds(&mut self) -> CompositeResult<Bounds> {
        let bounds = self
            .map
            .strips
            .values()
            .map(StripGeometry::bounds)
            .reduce(Bounds::union);

        self.map.absolute_bounds = bounds;
        bounds.ok_or(CompositeError::NoGeometry)
    }

    #[inline]
    pub fn absolute_bounds(&self) -> Option<Bounds> {
        self.map.absolute_bounds()
    }

    #[inline]
    pub fn strip(&self, strip_id: StripId) -> Option<&StripGeometry> {
        self.map.strip(strip_id)
    }

    #[inline]
    pub fn screen_map(&self) -> &ScreenMap {
        &self.map
    }

    #[inline]
    pub fn total_pixels(&self) -> usize {
        self.map.total_pixels()
    }

    #[inline]
    pub fn raster_size(&self) -> Option<SurfaceSize> {
        self.map.raster_size()
    }

    #[inline]
    pub fn geometry_version(&self) -> Option<GeometryVersion> {
        GeometryVersion::of(&self.map)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(list: &[(f32, f32)]) -> Vec<Vec2> {
        list.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[test]
    fn absolute_bounds_cover_every_strip() {
        let mut reg = ScreenMapRegistry::new();
        reg.declare_strip(0, pts(&[(0.0, 0.0), (4.0, 1.0)]), None).unwrap();
        reg.declare_strip(1, pts(&[(-2.0, 3.0), (1.0, 7.5)]), Some(2.0)).unwrap();

        let expected = reg
            .screen_map()
            .strips()
            .map(|(_, g)| g.bounds())
            .reduce(Bounds::union)
            .unwrap();

        assert_eq!(reg.absolute_bounds(), Some(expected));
        assert_eq!(expected.min, Vec2::new(-2.0, 0.0));
        assert_eq!(expected.max, Vec2::new(4.0, 7.5));
    }

    #[test]
    fn strip_inside_existing_bounds_keeps_them() {
        let mut reg = ScreenMapRegistry::new();
        reg.declare_strip(0, pts(&[(0.0, 0.0), (10.0, 10.0)]), None).unwrap();
        let before = reg.absolute_bounds();

        reg.declare_strip(1, pts(&[(2.0, 3.0), (9.0, 9.0)]), None).unwrap();
        assert_eq!(reg.absolute_bounds(), before);
    }

    #[test]
    fn redeclared_strip_shrinks_bounds() {
        let mut reg = ScreenMapRegistry::new();
        reg.declare_strip(0, pts(&[(0.0, 0.0), (1.0, 1.0)]), None).unwrap();
        reg.declare_strip(1, pts(&[(50.0, 50.0)]), None).unwrap();
        reg.declare_strip(1, pts(&[(0.5, 0.5)]), None).unwrap();

        let b = reg.absolute_bounds().unwrap();
        assert_eq!(b.max, Vec2::new(1.0, 1.0));
        assert_eq!(reg.total_pixels(), 3);
    }

    #[test]
    fn empty_map_is_rejected_and_not_stored() {
        let mut reg = ScreenMapRegistry::new();
        let err = reg.declare_strip(3, Vec::new(), None).unwrap_err();
        assert_eq!(err, CompositeError::InvalidGeometry { strip_id: 3 });
        assert!(reg.strip(3).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn recompute_without_strips_is_no_geometry() {
        let mut reg = ScreenMapRegistry::new();
        assert_eq!(reg.recompute_absolute_bounds(), Err(CompositeError::NoGeometry));
        assert!(reg.absolute_bounds().is_none());
        assert!(reg.geometry_version().is_none());
    }

    #[test]
    fn raster_size_rounds_extent_up_plus_one() {
        let mut reg = ScreenMapRegistry::new();
        reg.declare_strip(0, pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]), None).unwrap();
        assert_eq!(reg.raster_size(), Some(SurfaceSize::new(3, 1)));

        reg.declare_strip(1, pts(&[(2.5, 1.2)]), None).unwrap();
        assert_eq!(reg.raster_size(), Some(SurfaceSize::new(4, 3)));
    }

    #[test]
    fn geometry_version_tracks_count_and_bounds() {
        let mut reg = ScreenMapRegistry::new();
        reg.declare_strip(0, pts(&[(0.0, 0.0), (1.0, 0.0)]), None).unwrap();
        let v1 = reg.geometry_version().unwrap();

        reg.declare_strip(0, pts(&[(0.0, 0.0), (1.0, 0.0)]), Some(3.0)).unwrap();
        assert_eq!(reg.geometry_version().unwrap(), v1);

        reg.declare_strip(0, pts(&[(0.0, 0.0), (2.0, 0.0)]), None).unwrap();
        assert_ne!(reg.geometry_version().unwrap(), v1);
    }
}
