use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::coords::{SurfaceSize, Vec2};
use crate::error::{CompositeError, CompositeResult};
use crate::frame::{FrameBuffer, Rgb};
use crate::screen_map::ScreenMap;

use super::backend::{BloomParams, DiskDesc, SceneBackend, SceneDesc};
use super::compositor::{FrameCompositor, FrameStats};
use super::layout::{DiskSizing, SceneLayout};

/// Renders one persistent disk per mapped pixel, then a bloom pass.
///
/// Pixels landing on the same coordinate are merged and the brightest one is shown.
/// The disk set is rebuilt only when the total number of mapped pixels changes.
pub struct SceneCompositor<B: SceneBackend> {
    backend: B,
    bloom_params: BloomParams,
    state: Option<SceneState<B>>,
    /// Render size of the last build, restored on reset.
    last_size: Option<SurfaceSize>,
}

struct SceneState<B: SceneBackend> {
    total_pixels: usize,
    layout: SceneLayout,
    disks: Vec<B::Disk>,
    bloom: B::Bloom,
    scene: B::Scene,
}

/// Winner of one coordinate group.
#[derive(Debug, Copy, Clone)]
struct Resolved {
    position: Vec2,
    color: Rgb,
    brightness: f32,
}

impl<B: SceneBackend> SceneCompositor<B> {
    pub fn new(backend: B, bloom_params: BloomParams) -> Self {
        Self {
            backend,
            bloom_params,
            state: None,
            last_size: None,
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

    #[inline]
    pub fn bloom_params(&self) -> BloomParams {
        self.bloom_params
    }

    pub fn layout(&self) -> Option<SceneLayout> {
        self.state.as_ref().map(|s| s.layout)
    }

    pub fn disk_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.disks.len())
    }

    pub fn scene(&self) -> Option<&B::Scene> {
        self.state.as_ref().map(|s| &s.scene)
    }

    /// Disposes every disk and the bloom pipeline. Returns whether anything was held.
    fn release(&mut self) -> bool {
        let Some(state) = self.state.take() else {
            return false;
        };
        let SceneState {
            disks,
            bloom,
            mut scene,
            ..
        } = state;

        let count = disks.len();
        for disk in disks {
            self.backend.dispose_disk(&mut scene, disk);
        }
        drop(bloom);
        drop(scene);

        log::debug!("scene released ({count} disks)");
        true
    }
}

impl<B: SceneBackend> FrameCompositor for SceneCompositor<B> {
    fn initialize(&mut self, screen_map: &ScreenMap) -> CompositeResult<()> {
        self.reset();

        let bounds = screen_map
            .absolute_bounds()
            .ok_or(CompositeError::NoGeometry)?;
        let layout = SceneLayout::for_canvas(self.backend.size());

        let mut scene = self.backend.create_scene(&SceneDesc {
            size: layout.render,
        })?;
        let bloom = self.backend.compose_bloom(&scene, &self.bloom_params)?;

        self.backend.resize(layout.render);
        self.backend.set_display_size(layout.display);

        let sizing = DiskSizing::new(screen_map, bounds, layout.render);
        let total_pixels = screen_map.total_pixels();
        let mut disks = Vec::with_capacity(total_pixels);

        for (_, geometry) in screen_map.strips() {
            let radius = sizing.radius(geometry);
            for &p in geometry.map() {
                let desc = DiskDesc {
                    center: layout.project(p, bounds),
                    radius,
                    color: [0.0; 3],
                };
                disks.push(self.backend.create_disk(&mut scene, &desc));
            }
        }

        log::info!(
            "scene built: {} disks, render {}x{}, display {}x{}",
            disks.len(),
            layout.render.width,
            layout.render.height,
            layout.display.width,
            layout.display.height
        );

        self.last_size = Some(layout.render);
        self.state = Some(SceneState {
            total_pixels,
            layout,
            disks,
            bloom,
            scene,
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

        let bounds = screen_map
            .absolute_bounds()
            .ok_or(CompositeError::NoGeometry)?;
        let total_pixels = screen_map.total_pixels();
        if self.state.as_ref().map(|s| s.total_pixels) != Some(total_pixels) {
            self.initialize(screen_map)?;
        }
        let Some(state) = self.state.as_mut() else {
            return Err(CompositeError::NoGeometry);
        };

        let mut stats = FrameStats::default();
        let resolved = resolve_brightest(frame, screen_map, &mut stats);

        let assigned = resolved.len().min(state.disks.len());
        for (disk, entry) in state.disks.iter().zip(resolved.values()) {
            let center = state.layout.project(entry.position, bounds);
            self.backend
                .update_disk(&mut state.scene, disk, center, entry.color.to_unit());
            stats.pixels_drawn += 1;
        }

        let parked = state.layout.offscreen();
        for disk in &state.disks[assigned..] {
            self.backend
                .update_disk(&mut state.scene, disk, parked, [0.0; 3]);
        }

        if resolved.len() > state.disks.len() {
            log::debug!(
                "{} resolved pixels have no disk",
                resolved.len() - state.disks.len()
            );
        }

        self.backend.render(&mut state.scene, &mut state.bloom);
        Ok(stats)
    }

    fn reset(&mut self) {
        if !self.release() {
            return;
        }
        if let Some(size) = self.last_size {
            self.backend.resize(size);
        }
    }
}

impl<B: SceneBackend> Drop for SceneCompositor<B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Groups the frame's pixels by target coordinate in first-seen order, keeping the
/// brightest pixel of each group. Ties keep the earlier pixel.
fn resolve_brightest(
    frame: &FrameBuffer,
    screen_map: &ScreenMap,
    stats: &mut FrameStats,
) -> IndexMap<(u32, u32), Resolved> {
    let mut groups: IndexMap<(u32, u32), Resolved> = IndexMap::new();

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
        for (index, color) in strip.pixels().enumerate() {
            let Some(&position) = map.get(index) else {
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

            let candidate = Resolved {
                position,
                color,
                brightness: color.brightness(),
            };
            match groups.entry(position.key()) {
                Entry::Occupied(mut slot) => {
                    if candidate.brightness > slot.get().brightness {
                        slot.insert(candidate);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
            }
        }
    }

    groups
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

    fn backend(canvas: SurfaceSize) -> FakeBackend {
        let mut b = FakeBackend::new();
        b.resize(canvas);
        b
    }

    #[test]
    fn one_disk_per_mapped_pixel_in_strip_then_map_order() {
        let reg = registry(&[
            (2, &[(4.0, 0.0)], None),
            (0, &[(0.0, 0.0), (1.0, 0.0)], None),
        ]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(5, 1)), BloomParams::default());
        comp.initialize(reg.screen_map()).unwrap();

        let scene = comp.scene().unwrap();
        assert_eq!(scene.disks.len(), 3);
        assert_eq!(scene.disks[0].center.x, -640.0);
        assert_eq!(scene.disks[2].center.x, 640.0);
        assert_eq!(comp.backend().live_blooms(), 1);
    }

    #[test]
    fn render_size_is_twice_display() {
        let reg = registry(&[(0, &[(0.0, 0.0), (2.0, 0.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(3, 1)), BloomParams::default());
        comp.initialize(reg.screen_map()).unwrap();

        assert_eq!(comp.backend().display_size(), SurfaceSize::new(640, 213));
        assert_eq!(comp.backend().size(), SurfaceSize::new(1280, 426));
    }

    #[test]
    fn brightest_pixel_wins_shared_coordinate() {
        let reg = registry(&[
            (0, &[(1.0, 1.0)], None),
            (1, &[(1.0, 1.0), (0.0, 0.0)], None),
        ]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(2, 2)), BloomParams::default());

        // brightness 0.2 then 0.8 at (1, 1)
        let dim = Rgb::new(51, 51, 51);
        let bright = Rgb::new(204, 204, 204);
        let frame = FrameBuffer::new(vec![
            StripFrame::from_pixels(0, [dim]),
            StripFrame::from_pixels(1, [bright, Rgb::new(9, 0, 0)]),
        ]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(stats.pixels_drawn, 2);

        let scene = comp.scene().unwrap();
        assert_eq!(scene.disks[0].color, bright.to_unit());
        // the third disk has no resolved pixel and is parked
        let layout = comp.layout().unwrap();
        assert_eq!(scene.disks[2].center, layout.offscreen());
        assert_eq!(scene.disks[2].color, [0.0; 3]);
        assert_eq!(scene.renders, 1);
    }

    #[test]
    fn equal_brightness_keeps_first_seen() {
        let reg = registry(&[(0, &[(0.0, 0.0), (0.0, 0.0), (3.0, 3.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(4, 4)), BloomParams::default());

        let frame = FrameBuffer::new(vec![StripFrame::from_pixels(
            0,
            [Rgb::new(90, 0, 0), Rgb::new(0, 90, 0), Rgb::new(1, 1, 1)],
        )]);
        comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(comp.scene().unwrap().disks[0].color, Rgb::new(90, 0, 0).to_unit());
    }

    #[test]
    fn missing_strip_is_skipped() {
        let reg = registry(&[(0, &[(0.0, 0.0), (1.0, 1.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(2, 2)), BloomParams::default());

        let frame = FrameBuffer::new(vec![
            StripFrame::from_pixels(5, [Rgb::new(255, 255, 255)]),
            StripFrame::from_pixels(0, [Rgb::new(10, 10, 10)]),
        ]);
        let stats = comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(stats.strips_skipped, 1);
        assert_eq!(stats.pixels_drawn, 1);
    }

    #[test]
    fn rebuilds_only_when_pixel_count_changes() {
        let mut reg = registry(&[(0, &[(0.0, 0.0), (1.0, 0.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(2, 1)), BloomParams::default());
        let frame = FrameBuffer::new(vec![StripFrame::from_pixels(0, [Rgb::new(1, 2, 3)])]);

        comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(comp.backend().scenes_created(), 1);

        // same count, moved pixels
        reg.declare_strip(0, vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0)], None)
            .unwrap();
        comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(comp.backend().scenes_created(), 1);

        reg.declare_strip(1, vec![Vec2::new(2.0, 2.0)], None).unwrap();
        comp.render_frame(&frame, reg.screen_map()).unwrap();
        assert_eq!(comp.backend().scenes_created(), 2);
        assert_eq!(comp.disk_count(), 3);
        assert_eq!(comp.backend().live_disks(), 3);
    }

    #[test]
    fn reset_disposes_all_and_restores_size() {
        let reg = registry(&[(0, &[(0.0, 0.0), (1.0, 1.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(2, 2)), BloomParams::default());
        comp.reset();

        comp.initialize(reg.screen_map()).unwrap();
        let built = comp.backend().size();
        assert_eq!(comp.backend().live_disks(), 2);

        comp.backend_mut().resize(SurfaceSize::new(2, 2));
        comp.reset();
        comp.reset();
        assert_eq!(comp.backend().live_disks(), 0);
        assert_eq!(comp.backend().live_blooms(), 0);
        assert_eq!(comp.backend().size(), built);
        assert!(!comp.is_initialized());
    }

    #[test]
    fn empty_frame_is_a_no_op() {
        let reg = registry(&[(0, &[(0.0, 0.0)], None)]);
        let mut comp = SceneCompositor::new(backend(SurfaceSize::new(1, 1)), BloomParams::default());
        let stats = comp.render_frame(&FrameBuffer::default(), reg.screen_map()).unwrap();
        assert_eq!(stats, FrameStats::default());
        assert!(!comp.is_initialized());
    }

    #[test]
    fn failed_bloom_leaves_nothing_allocated() {
        let reg = registry(&[(0, &[(0.0, 0.0)], None)]);
        let mut b = backend(SurfaceSize::new(1, 1));
        b.fail_bloom(true);
        let mut comp = SceneCompositor::new(b, BloomParams::default());

        assert!(comp.initialize(reg.screen_map()).unwrap_err().is_fatal());
        assert!(!comp.is_initialized());
        assert_eq!(comp.backend().live_scenes(), 0);
    }
}
