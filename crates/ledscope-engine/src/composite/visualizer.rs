use crate::coords::Vec2;
use crate::error::{CompositeError, CompositeResult};
use crate::events::StripEvent;
use crate::frame::{FrameBuffer, StripFrameStore};
use crate::screen_map::{ScreenMapRegistry, StripId};

use super::backend::{BloomParams, DrawingSurface, RasterBackend, SceneBackend};
use super::compositor::{Compositor, CompositorKind, FrameCompositor, FrameStats};
use super::layout::display_size_for;

/// One visualization session: declared geometry, latest strip colors and the active
/// compositor.
pub struct Visualizer<B>
where
    B: RasterBackend + SceneBackend,
{
    registry: ScreenMapRegistry,
    store: StripFrameStore,
    compositor: Compositor<B>,
    geometry_dirty: bool,
}

impl<B> Visualizer<B>
where
    B: RasterBackend + SceneBackend,
{
    pub fn new(kind: CompositorKind, backend: B, bloom: BloomParams) -> Self {
        Self {
            registry: ScreenMapRegistry::new(),
            store: StripFrameStore::new(),
            compositor: Compositor::new(kind, backend, bloom),
            geometry_dirty: false,
        }
    }

    #[inline]
    pub fn registry(&self) -> &ScreenMapRegistry {
        &self.registry
    }

    #[inline]
    pub fn store(&self) -> &StripFrameStore {
        &self.store
    }

    #[inline]
    pub fn compositor(&self) -> &Compositor<B> {
        &self.compositor
    }

    #[inline]
    pub fn surface(&self) -> &B {
        self.compositor.backend()
    }

    /// Applies one decoded strip event. Returns whether geometry changed.
    pub fn on_strip_update(&mut self, event: StripEvent) -> CompositeResult<bool> {
        match event {
            StripEvent::SetCanvasMap {
                strip_id,
                map,
                diameter,
            } => {
                self.declare_strip(strip_id, map, diameter)?;
                Ok(true)
            }
            StripEvent::Unsupported(name) => {
                log::warn!("we do not support event {name} yet");
                Ok(false)
            }
        }
    }

    /// Declares strip geometry and sizes the drawing surface to the new raster.
    pub fn declare_strip(
        &mut self,
        strip_id: StripId,
        map: Vec<Vec2>,
        diameter: Option<f32>,
    ) -> CompositeResult<()> {
        self.registry.declare_strip(strip_id, map, diameter)?;
        self.apply_canvas_size()?;
        self.geometry_dirty = true;
        Ok(())
    }

    pub fn on_strip_added(&mut self, strip_id: StripId, len: usize) {
        log::info!("strip added: id {strip_id}, length {len}");
    }

    /// Stores the latest RGB bytes for a strip; drawn by [`Self::render_stored`].
    pub fn update_strip(&mut self, strip_id: StripId, pixel_data: &[u8]) {
        self.store.update(strip_id, pixel_data);
    }

    /// Renders a snapshot of every stored strip.
    pub fn render_stored(&mut self) -> CompositeResult<FrameStats> {
        let frame = self.store.frame();
        self.on_frame(&frame)
    }

    pub fn on_frame(&mut self, frame: &FrameBuffer) -> CompositeResult<FrameStats> {
        if frame.is_empty() {
            log::warn!("{}", CompositeError::EmptyFrame);
            return Ok(FrameStats::default());
        }

        if self.geometry_dirty {
            self.geometry_dirty = false;
            self.compositor.geometry_changed();
            self.apply_canvas_size()?;
        }

        self.compositor
            .render_frame(frame, self.registry.screen_map())
    }

    /// Releases the compositor's resources; the next frame rebuilds them.
    pub fn reset(&mut self) {
        self.compositor.reset();
    }

    #[inline]
    pub fn kind(&self) -> CompositorKind {
        self.compositor.kind()
    }

    fn apply_canvas_size(&mut self) -> CompositeResult<()> {
        let raster = self
            .registry
            .raster_size()
            .ok_or(CompositeError::NoGeometry)?;
        let surface = self.compositor.backend_mut();
        surface.resize(raster);
        surface.set_display_size(display_size_for(raster));
        log::debug!("canvas size {}x{}", raster.width, raster.height);
        Ok(())
    }
}
