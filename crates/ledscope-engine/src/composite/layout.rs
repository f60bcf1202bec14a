use std::f32::consts::PI;

use crate::coords::{Bounds, SurfaceSize, Vec2};
use crate::screen_map::{ScreenMap, StripGeometry};

use super::DISPLAY_WIDTH;

/// Display size for a canvas: [`DISPLAY_WIDTH`] wide, height following its aspect.
pub fn display_size_for(canvas: SurfaceSize) -> SurfaceSize {
    let height = (DISPLAY_WIDTH as f32 * canvas.aspect_ratio()).round().max(1.0) as u32;
    SurfaceSize::new(DISPLAY_WIDTH, height)
}

/// Sizing of the scene back-end: 1x display size, 2x internal render size.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneLayout {
    pub display: SurfaceSize,
    pub render: SurfaceSize,
}

impl SceneLayout {
    pub fn for_canvas(canvas: SurfaceSize) -> Self {
        let display = display_size_for(canvas);
        Self {
            display,
            render: SurfaceSize::new(display.width.saturating_mul(2), display.height.saturating_mul(2)),
        }
    }

    /// Maps a physical position to scene space (origin at the center, +Y up).
    ///
    /// A degenerate axis maps to the center of the scene.
    pub fn project(&self, p: Vec2, bounds: Bounds) -> Vec2 {
        let w = self.render.width as f32;
        let h = self.render.height as f32;
        let nx = normalized(p.x - bounds.min.x, bounds.width());
        let ny = normalized(p.y - bounds.min.y, bounds.height());
        Vec2::new(nx * w - w / 2.0, -ny * h + h / 2.0)
    }

    /// Parking spot for unused disks, outside the visible area.
    pub fn offscreen(&self) -> Vec2 {
        Vec2::new(
            -(self.render.width as f32) - 1000.0,
            -(self.render.height as f32) - 1000.0,
        )
    }
}

fn normalized(offset: f32, extent: f32) -> f32 {
    if extent > 0.0 { offset / extent } else { 0.5 }
}

/// Disk radius rules of the scene back-end, resolved once per rebuild.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DiskSizing {
    /// Physical unit to render pixel factor.
    scale: f32,
    /// Radius for strips without a declared diameter.
    fallback: f32,
}

const DENSE_RANGE: std::ops::RangeInclusive<f32> = 0.9..=1.1;
const MIN_DOT: f32 = 4.0;
const DOT_FILL: f32 = 0.4;

impl DiskSizing {
    pub(crate) fn new(screen_map: &ScreenMap, bounds: Bounds, render: SurfaceSize) -> Self {
        let extent = [bounds.width(), bounds.height()]
            .into_iter()
            .find(|e| *e > 0.0)
            .unwrap_or(1.0);
        let scale = render.width as f32 / extent;

        let declared: Vec<f32> = screen_map
            .strips()
            .filter_map(|(_, g)| g.diameter())
            .collect();
        let total = screen_map.total_pixels().max(1) as f32;
        let area = bounds.area();

        let fallback = if declared.is_empty() && area > 0.0 && DENSE_RANGE.contains(&(total / area)) {
            1.0
        } else {
            let mean = if declared.is_empty() {
                1.0
            } else {
                declared.iter().sum::<f32>() / declared.len() as f32
            };
            ((area / (total * PI)).sqrt() * DOT_FILL).max(MIN_DOT) * mean
        };

        Self { scale, fallback }
    }

    pub(crate) fn radius(&self, geometry: &StripGeometry) -> f32 {
        match geometry.diameter() {
            Some(d) => d * self.scale,
            None => self.fallback,
        }
    }
}
