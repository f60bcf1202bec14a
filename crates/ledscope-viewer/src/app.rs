use ledscope_engine::composite::{BloomParams, CompositorKind, Visualizer};
use ledscope_engine::coords::SurfaceSize;
use ledscope_engine::core::{App, AppControl, FrameCtx};
use ledscope_engine::events::StripEvent;
use ledscope_engine::render::{CanvasPresenter, GpuCanvas};
use ledscope_engine::screen_map::StripId;
use winit::event::WindowEvent;
use winit::keyboard::{Key, NamedKey};

use crate::demo::Rainbow;

/// Feeds a rainbow animation through a [`Visualizer`] and presents its canvas.
pub struct ViewerApp {
    kind: CompositorKind,
    bloom: BloomParams,
    pending: Vec<StripEvent>,
    visualizer: Option<Visualizer<GpuCanvas>>,
    presenter: CanvasPresenter,
    strips: Vec<(StripId, usize)>,
    pattern: Rainbow,
    scratch: Vec<u8>,
    elapsed: f32,
}

impl ViewerApp {
    pub fn new(kind: CompositorKind, bloom: BloomParams, events: Vec<StripEvent>) -> Self {
        let filter = match kind {
            CompositorKind::Raster => wgpu::FilterMode::Nearest,
            CompositorKind::Scene => wgpu::FilterMode::Linear,
        };
        Self {
            kind,
            bloom,
            pending: events,
            visualizer: None,
            presenter: CanvasPresenter::new(filter),
            strips: Vec::new(),
            pattern: Rainbow::default(),
            scratch: Vec::new(),
            elapsed: 0.0,
        }
    }

    /// Builds the session on the first frame, once a device exists.
    fn start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Option<Visualizer<GpuCanvas>> {
        let canvas = GpuCanvas::new(ctx.gpu.device(), ctx.gpu.queue(), SurfaceSize::new(1, 1));
        let mut vis = Visualizer::new(self.kind, canvas, self.bloom);

        for event in self.pending.drain(..) {
            if let Err(err) = vis.on_strip_update(event) {
                log::warn!("{err}");
            }
        }

        if vis.registry().is_empty() {
            log::error!("no strip geometry declared, nothing to show");
            return None;
        }

        self.strips = vis
            .registry()
            .screen_map()
            .strips()
            .map(|(id, geometry)| (id, geometry.len()))
            .collect();
        for &(id, len) in &self.strips {
            vis.on_strip_added(id, len);
        }

        let pixels = vis.registry().total_pixels();
        ctx.runtime
            .set_title(format!("ledscope ({}, {} strips, {pixels} pixels)", self.kind.name(), self.strips.len()));
        Some(vis)
    }
}

impl App for ViewerApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state.is_pressed() && event.logical_key == Key::Named(NamedKey::Escape) {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.visualizer.is_none() {
            match self.start(ctx) {
                Some(vis) => self.visualizer = Some(vis),
                None => return AppControl::Exit,
            }
        }
        let Some(vis) = self.visualizer.as_mut() else {
            return AppControl::Exit;
        };

        self.elapsed += ctx.time.dt;
        for &(id, len) in &self.strips {
            self.pattern.fill(id, len, self.elapsed, &mut self.scratch);
            vis.update_strip(id, &self.scratch);
        }

        if ctx.time.frame_index == 0 {
            match vis.store().info_json() {
                Ok(info) => log::debug!("strips: {info}"),
                Err(err) => log::warn!("failed to encode strip info: {err}"),
            }
        }

        match vis.render_stored() {
            Ok(stats) => log::trace!(
                "frame {}: {} strips, {} pixels drawn, {} skipped",
                ctx.time.frame_index,
                stats.strips_drawn,
                stats.pixels_drawn,
                stats.pixels_skipped
            ),
            Err(err) if err.is_fatal() => {
                log::error!("{err}");
                return AppControl::Exit;
            }
            Err(err) => log::warn!("{err}"),
        }

        let vis = &*vis;
        let presenter = &mut self.presenter;
        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            presenter.render(rctx, target, vis.surface());
        })
    }
}
