use crate::error::CompositeResult;
use crate::frame::FrameBuffer;
use crate::screen_map::ScreenMap;

use super::backend::{BloomParams, RasterBackend, SceneBackend};
use super::raster::RasterCompositor;
use super::scene::SceneCompositor;

/// Counters from one `render_frame` call.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub strips_drawn: u32,
    pub strips_skipped: u32,
    pub pixels_drawn: u32,
    pub pixels_skipped: u32,
}

/// Shared contract of the compositing back-ends.
pub trait FrameCompositor {
    /// Allocates resources for `screen_map`. A no-op when nothing relevant changed.
    fn initialize(&mut self, screen_map: &ScreenMap) -> CompositeResult<()>;

    /// Draws one frame. Per-strip and per-pixel anomalies are logged and skipped.
    fn render_frame(
        &mut self,
        frame: &FrameBuffer,
        screen_map: &ScreenMap,
    ) -> CompositeResult<FrameStats>;

    /// Releases every resource. Safe to call repeatedly or before `initialize`.
    fn reset(&mut self);

    /// Notification that strip geometry was redeclared since the last frame.
    fn geometry_changed(&mut self) {
        self.reset();
    }
}

/// Back-end selection, made once from configuration.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompositorKind {
    #[default]
    Raster,
    Scene,
}

impl CompositorKind {
    pub fn name(self) -> &'static str {
        match self {
            CompositorKind::Raster => "raster",
            CompositorKind::Scene => "scene",
        }
    }
}

/// The active compositor. Per-frame calls dispatch on the variant.
pub enum Compositor<B>
where
    B: RasterBackend + SceneBackend,
{
    Raster(RasterCompositor<B>),
    Scene(SceneCompositor<B>),
}

impl<B> Compositor<B>
where
    B: RasterBackend + SceneBackend,
{
    pub fn new(kind: CompositorKind, backend: B, bloom: BloomParams) -> Self {
        log::info!("using {} compositor", kind.name());
        match kind {
            CompositorKind::Raster => Compositor::Raster(RasterCompositor::new(backend)),
            CompositorKind::Scene => Compositor::Scene(SceneCompositor::new(backend, bloom)),
        }
    }

    pub fn kind(&self) -> CompositorKind {
        match self {
            Compositor::Raster(_) => CompositorKind::Raster,
            Compositor::Scene(_) => CompositorKind::Scene,
        }
    }

    pub fn backend(&self) -> &B {
        match self {
            Compositor::Raster(c) => c.backend(),
            Compositor::Scene(c) => c.backend(),
        }
    }

    pub fn backend_mut(&mut self) -> &mut B {
        match self {
            Compositor::Raster(c) => c.backend_mut(),
            Compositor::Scene(c) => c.backend_mut(),
        }
    }
}

impl<B> FrameCompositor for Compositor<B>
where
    B: RasterBackend + SceneBackend,
{
    fn initialize(&mut self, screen_map: &ScreenMap) -> CompositeResult<()> {
        match self {
            Compositor::Raster(c) => c.initialize(screen_map),
            Compositor::Scene(c) => c.initialize(screen_map),
        }
    }

    fn render_frame(
        &mut self,
        frame: &FrameBuffer,
        screen_map: &ScreenMap,
    ) -> CompositeResult<FrameStats> {
        match self {
            Compositor::Raster(c) => c.render_frame(frame, screen_map),
            Compositor::Scene(c) => c.render_frame(frame, screen_map),
        }
    }

    fn reset(&mut self) {
        match self {
            Compositor::Raster(c) => c.reset(),
            Compositor::Scene(c) => c.reset(),
        }
    }

    fn geometry_changed(&mut self) {
        match self {
            Compositor::Raster(c) => c.geometry_changed(),
            Compositor::Scene(c) => c.geometry_changed(),
        }
    }
}
