use crate::coords::{SurfaceSize, Vec2};
use crate::error::{CompositeError, CompositeResult};
use crate::frame::{FrameBuffer, Rgb};
use crate::screen_map::{GeometryVersion, ScreenMap};

use super::backend::RasterBackend;
use super::compositor::{FrameCompositor, FrameStats};
use super::layout::display_size_for;

/// Paints every mapped pixel into a CPU RGB raster and blits it as one textured quad.
///
/// The texture is allocated at the raster size rounded up to powers of two and is
/// kept across geometry changes that stay within the same rounded size. Where pixels
/// overlap, the one drawn last wins.
pub struct RasterCompositor<B: RasterBackend> {
    backend: B,
    state: Option<RasterState<B>>,
}

struct RasterState<B: RasterBackend> {
    version: GeometryVersion,
    raster: SurfaceSize,
    texture_size: SurfaceSize,
    pixels: Vec<u8>,
    // texture before program: handles drop in declaration order
    texture: B::Texture,
    program: B::Program,
}

impl<B: RasterBackend> RasterCompositor<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: None,
        }
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Size of the painted area, `ceil(extent) + 1` per axis.
    pub fn raster_size(&self) -> Option<SurfaceSize> {
        self.state.as_ref().map(|s| s.raster)
    }

    /// Allocated texture size; each axis a power of two.
    pub fn texture_size(&self) -> Option<SurfaceSize> {
        self.state.as_ref().map(|s| s.texture_size)
    }

    /// Color painted at raster cell `(x, y)` by the last frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let state = self.state.as_ref()?;
        if x >= state.raster.width || y >= state.raster.height {
            return None;
        }
        let i = (y as usize * state.texture_size.width as usize + x as usize) * 3;
        Some(Rgb::new(state.pixels[i], state.pixels[i + 1], state.pixels[i + 2]))
    }

    fn apply_surface_size(&mut self, raster: SurfaceSize) {
        self.backend.resize(raster);
        self.backend.set_display_size(display_size_for(raster));
    }
}

impl<B: RasterBackend> FrameCompositor for RasterCompositor<B> {
    fn initialize(&mut self, screen_map: &ScreenMap) -> CompositeResult<()> {
        let version = GeometryVersion::of(screen_map).ok_or(CompositeError::NoGeometry)?;
        let raster = screen_map.raster_size().ok_or(CompositeError::NoGeometry)?;
        let texture_size = raster.checked_next_power_of_two().ok_or_else(|| {
            CompositeError::unsupported_surface(format!(
                "raster {}x{} has no power-of-two texture size",
                raster.width, raster.height
            ))
        })?;

        match self.state.as_mut() {
            Some(state) if state.version == version => return Ok(()),
            Some(state) if state.texture_size == texture_size => {
                log::debug!(
                    "raster resized to {}x{} within {}x{} texture",
                    raster.width,
                    raster.height,
                    texture_size.width,
                    texture_size.height
                );
                state.version = version;
                state.raster = raster;
                self.apply_surface_size(raster);
                return Ok(());
            }
            _ => {}
        }

        self.reset();

        let program = self.backend.create_program()?;
        let texture = self.backend.create_texture(&program, texture_size)?;
        self.apply_surface_size(raster);

        log::info!(
            "raster {}x{} allocated, texture {}x{}",
            raster.width,
            raster.height,
            texture_size.width,
            texture_size.height
        );

        self.state = Some(RasterState {
            version,
            raster,
            texture_size,
            pixels: vec![0; texture_size.byte_len(3)],
            texture,
            program,
        });
        Ok(())
    }

    fn render_frame(
        &mut self,
        frame: &FrameBuffer,
        screen_map: &ScreenMap,
    ) -> CompositeResult<FrameStats> {
        if frame.is_empty() {
            log::warn!("{}", CompositeError::EmptyFrame);
            return Ok(FrameStats::default());
        }

        let version = GeometryVersion::of(screen_map).ok_or(CompositeError::NoGeometry)?;
        if self.state.as_ref().map(|s| s.version) != Some(version) {
            self.initialize(screen_map)?;
        }
        let Some(state) = self.state.as_mut() else {
            return Err(CompositeError::NoGeometry);
        };

        state.pixels.fill(0);
        let stats = state.paint(frame, screen_map, version.bounds.min);

        self.backend
            .upload_rgb(&state.texture, state.texture_size, &state.pixels);

        let uv_scale = [
            state.raster.width as f32 / state.texture_size.width as f32,
            state.raster.height as f32 / state.texture_size.height as f32,
        ];
        self.backend
            .draw_quad(&state.program, &state.texture, uv_scale);

        Ok(stats)
    }

    fn reset(&mut self) {
        if self.state.take().is_some() {
            log::debug!("raster compositor released");
        }
    }

    fn geometry_changed(&mut self) {
        // the version check in render_frame decides whether to reallocate
    }
}

impl<B: RasterBackend> Drop for RasterCompositor<B> {
    fn drop(&mut self) {
        self.reset();
    }
}

// ── painting ──────────────────────────────────────────────────────────────────

impl<B: RasterBackend> RasterState<B> {
    fn paint(&mut self, frame: &FrameBuffer, screen_map: &ScreenMap, origin: Vec2) -> FrameStats {
        let mut stats = FrameStats::default();

        for strip in frame.strips() {
            let Some(geometry) = screen_map.strip(strip.strip_id) else {
                log::warn!(
                    "{}",
                    CompositeError::MissingStripGeometry {
                        strip_id: strip.strip_id
                    }
                );
                stats.strips_skipped += 1;
                continue;
            };
            stats.strips_drawn += 1;

            let map = geometry.map();
            let max_radius = self.raster.width.max(self.raster.height) as i64;
            let radius = ((geometry.diameter().unwrap_or(1.0) / 2.0).floor().max(0.0) as i64)
                .min(max_radius);

            for (index, rgb) in strip.pixels().enumerate() {
                let Some(&pos) = map.get(index) else {
                    log::warn!(
                        "{}",
                        CompositeError::PixelIndexOutOfRange {
                            strip_id: strip.strip_id,
                            index,
                            map_len: map.len(),
                        }
                    );
                    stats.pixels_skipped += 1;
                    continue;
                };

                // truncation toward zero
                let x = (pos.x - origin.x) as i64;
                let y = (pos.y - origin.y) as i64;

                if x < 0 || y < 0 || x >= self.raster.width as i64 || y >= self.raster.height as i64 {
                    log::warn!(
                        "{}",
                        CompositeError::PixelOutOfCanvas {
                            strip_id: strip.strip_id,
                            index,
                            x,
                            y,
                        }
                    );
                    stats.pixels_skipped += 1;
                    continue;
                }

                self.fill_square(x, y, radius, rgb);
                stats.pixels_drawn += 1;
            }
        }

        stats
    }

    /// Fills the `(2r+1)^2` square centered on `(cx, cy)`, clipped to the raster.
    fn fill_square(&mut self, cx: i64, cy: i64, r: i64, rgb: Rgb) {
        let x0 = (cx - r).max(0);
        let x1 = (cx + r).min(self.raster.width as i64 - 1);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r).min(self.raster.height as i64 - 1);
        let stride = self.texture_size.width as usize;

        for y in y0..=y1 {
            let row = y as usize * stride;
            for x in x0..=x1 {
                let i = (row + x as usize) * 3;
                self.pixels[i] = rgb.r;
                self.pixels[i + 1] = rgb.g;
                self.pixels[i + 2] = rgb.b;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::DrawingSurface;
    use crate::composite::testing::FakeBackend;
    use crate::frame::StripFrame;
    use crate::screen_map::ScreenMapRegistry;

    fn registry(strips: &[(i32, &[(f32, f32)], Option<f32>)]) -> ScreenMapRegistry {
        let mut reg = ScreenMapRegistry::new();
        for &(id, pts, diameter) in strips {
            let map = pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            reg.declare_strip(id, map, diameter).unwrap();
        }
        reg
    }

    #[test]
    fn three_pixel_strip_fills_three_by_one_raster() {
        let reg = registry(&[(0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![255, 0, 0, 0, 255, 0, 0, 0, 255])]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();

        assert_eq!(comp.raster_size(), Some(SurfaceSize::new(3, 1)));
        assert_eq!(comp.texture_size(), Some(SurfaceSize::new(4, 1)));
        assert_eq!(comp.pixel(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(comp.pixel(1, 0), Some(Rgb::new(0, 255, 0)));
        assert_eq!(comp.pixel(2, 0), Some(Rgb::new(0, 0, 255)));
        assert_eq!(stats.pixels_drawn, 3);

        let backend = comp.backend();
        assert_eq!(backend.size(), SurfaceSize::new(3, 1));
        assert_eq!(backend.last_uv_scale(), Some([0.75, 1.0]));
        assert_eq!(backend.uploads(), 1);
        // full texture-sized upload
        assert_eq!(backend.last_upload_len(), Some(4 * 3));
    }

    #[test]
    fn texture_is_power_of_two_and_covers_raster() {
        let reg = registry(&[(0, &[(0.0, 0.0), (12.3, 4.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());
        comp.initialize(reg.screen_map()).unwrap();

        let raster = comp.raster_size().unwrap();
        let tex = comp.texture_size().unwrap();
        assert_eq!(raster, SurfaceSize::new(14, 5));
        assert!(tex.width.is_power_of_two() && tex.height.is_power_of_two());
        assert!(tex.width >= raster.width && tex.height >= raster.height);
    }

    #[test]
    fn unchanged_geometry_does_not_reallocate() {
        let reg = registry(&[(0, &[(0.0, 0.0), (5.0, 5.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());
        comp.initialize(reg.screen_map()).unwrap();
        comp.initialize(reg.screen_map()).unwrap();

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![1, 2, 3])]);
        comp.render_frame(&frame, reg.screen_map()).unwrap();

        assert_eq!(comp.backend().textures_created(), 1);
        assert_eq!(comp.backend().programs_created(), 1);
    }

    #[test]
    fn growth_within_bucket_keeps_texture() {
        let mut reg = registry(&[(0, &[(0.0, 0.0), (4.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());
        comp.initialize(reg.screen_map()).unwrap();
        assert_eq!(comp.texture_size(), Some(SurfaceSize::new(8, 1)));

        reg.declare_strip(1, vec![Vec2::new(6.0, 0.0)], None).unwrap();
        comp.initialize(reg.screen_map()).unwrap();
        assert_eq!(comp.raster_size(), Some(SurfaceSize::new(7, 1)));
        assert_eq!(comp.backend().textures_created(), 1);

        reg.declare_strip(2, vec![Vec2::new(9.0, 0.0)], None).unwrap();
        comp.initialize(reg.screen_map()).unwrap();
        assert_eq!(comp.texture_size(), Some(SurfaceSize::new(16, 1)));
        assert_eq!(comp.backend().textures_created(), 2);
        assert_eq!(comp.backend().live_textures(), 1);
    }

    #[test]
    fn overlapping_pixels_last_write_wins() {
        let reg = registry(&[(0, &[(1.0, 1.0), (1.0, 1.0)], None), (1, &[(0.0, 0.0), (2.0, 2.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![200, 200, 200, 10, 20, 30])]);
        comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(comp.pixel(1, 1), Some(Rgb::new(10, 20, 30)));
    }

    #[test]
    fn diameter_paints_clipped_square() {
        let reg = registry(&[(0, &[(0.0, 0.0), (4.0, 4.0)], Some(3.0))]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![9, 9, 9])]);
        comp.render_frame(&frame, reg.screen_map()).unwrap();

        assert_eq!(comp.pixel(0, 0), Some(Rgb::new(9, 9, 9)));
        assert_eq!(comp.pixel(1, 1), Some(Rgb::new(9, 9, 9)));
        assert_eq!(comp.pixel(2, 2), Some(Rgb::BLACK));
    }

    #[test]
    fn oversized_diameter_fills_whole_raster() {
        let reg = registry(&[(0, &[(0.0, 0.0), (1.0, 0.0)], Some(1e20))]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![4, 5, 6])]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();

        assert_eq!(stats.pixels_drawn, 1);
        assert_eq!(comp.pixel(0, 0), Some(Rgb::new(4, 5, 6)));
        assert_eq!(comp.pixel(1, 0), Some(Rgb::new(4, 5, 6)));
    }

    #[test]
    fn raster_too_wide_for_a_texture_is_unsupported() {
        let reg = registry(&[(0, &[(0.0, 0.0), (3e9, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let err = comp.initialize(reg.screen_map()).unwrap_err();
        assert!(matches!(err, CompositeError::UnsupportedSurface(_)));
        assert!(err.is_fatal());
        assert!(!comp.is_initialized());
        assert_eq!(comp.backend().textures_created(), 0);
    }

    #[test]
    fn missing_strip_is_skipped_and_others_render() {
        let reg = registry(&[(0, &[(0.0, 0.0), (1.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![
            StripFrame::new(5, vec![255, 255, 255]),
            StripFrame::new(0, vec![0, 0, 0, 7, 7, 7]),
        ]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();

        assert_eq!(stats.strips_skipped, 1);
        assert_eq!(stats.strips_drawn, 1);
        assert_eq!(comp.pixel(1, 0), Some(Rgb::new(7, 7, 7)));
    }

    #[test]
    fn pixels_beyond_map_are_skipped() {
        let reg = registry(&[(0, &[(0.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());

        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![1, 1, 1, 2, 2, 2])]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(stats.pixels_drawn, 1);
        assert_eq!(stats.pixels_skipped, 1);
    }

    #[test]
    fn empty_frame_is_a_no_op() {
        let reg = registry(&[(0, &[(0.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());
        let stats = comp.render_frame(&FrameBuffer::default(), reg.screen_map()).unwrap();

        assert_eq!(stats, FrameStats::default());
        assert!(!comp.is_initialized());
        assert_eq!(comp.backend().uploads(), 0);
    }

    #[test]
    fn no_geometry_is_an_error() {
        let reg = ScreenMapRegistry::new();
        let mut comp = RasterCompositor::new(FakeBackend::new());
        let frame = FrameBuffer::new(vec![StripFrame::new(0, vec![1, 1, 1])]);
        assert_eq!(
            comp.render_frame(&frame, reg.screen_map()),
            Err(CompositeError::NoGeometry)
        );
    }

    #[test]
    fn reset_is_idempotent_and_releases_everything() {
        let reg = registry(&[(0, &[(0.0, 0.0), (3.0, 0.0)], None)]);
        let mut comp = RasterCompositor::new(FakeBackend::new());
        comp.reset();

        comp.initialize(reg.screen_map()).unwrap();
        assert_eq!(comp.backend().live_textures(), 1);

        comp.reset();
        comp.reset();
        assert_eq!(comp.backend().live_textures(), 0);
        assert_eq!(comp.backend().live_programs(), 0);
        assert!(!comp.is_initialized());
    }

    #[test]
    fn failed_allocation_leaves_previous_state_released() {
        let reg = registry(&[(0, &[(0.0, 0.0), (3.0, 0.0)], None)]);
        let mut backend = FakeBackend::new();
        backend.fail_textures(true);
        let mut comp = RasterCompositor::new(backend);

        let err = comp.initialize(reg.screen_map()).unwrap_err();
        assert!(err.is_fatal());
        assert!(!comp.is_initialized());
        assert_eq!(comp.backend().live_programs(), 0);
    }
}
