use crate::composite::DrawingSurface;
use crate::render::{RenderCtx, RenderTarget};

use super::canvas::GpuCanvas;
use super::common::{
    QuadParams, color_attachment, create_quad_buffers, create_uniform, sampler,
    textured_quad_bgl, textured_quad_bind_group, textured_quad_pipeline,
};

/// Draws a [`GpuCanvas`] into the window, centered and scaled to fit its display
/// size (never enlarged past it).
pub struct CanvasPresenter {
    filter: wgpu::FilterMode,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,
    params_ubo: Option<wgpu::Buffer>,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    bind_group: Option<wgpu::BindGroup>,
    bound_generation: Option<u64>,
}

impl CanvasPresenter {
    /// `Nearest` keeps raster cells crisp; `Linear` suits the supersampled scene.
    pub fn new(filter: wgpu::FilterMode) -> Self {
        Self {
            filter,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            sampler: None,
            params_ubo: None,
            quad_vbo: None,
            quad_ibo: None,
            bind_group: None,
            bound_generation: None,
        }
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, canvas: &GpuCanvas) {
        if !ctx.viewport.is_valid() {
            return;
        }

        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx, canvas);

        let Some([x, y, w, h]) = ctx.content_rect(canvas.display_size()) else {
            return;
        };

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ledscope present pass"),
            color_attachments: &[Some(color_attachment(target.color_view, false))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..1);
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let bgl = textured_quad_bgl(ctx.device, "ledscope present bgl");
        let pipeline = textured_quad_pipeline(ctx.device, "ledscope present pipeline", &bgl, ctx.surface_format);

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.bound_generation = None;
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_none() || self.quad_ibo.is_none() {
            let (vbo, ibo) = create_quad_buffers(ctx.device, "ledscope present");
            self.quad_vbo = Some(vbo);
            self.quad_ibo = Some(ibo);
        }
        if self.params_ubo.is_none() {
            self.params_ubo = Some(create_uniform(
                ctx.device,
                "ledscope present params ubo",
                &QuadParams {
                    uv_scale: [1.0, 1.0],
                    _pad: [0.0; 2],
                },
            ));
        }
        if self.sampler.is_none() {
            self.sampler = Some(sampler(ctx.device, "ledscope present sampler", self.filter));
        }
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>, canvas: &GpuCanvas) {
        if self.bind_group.is_some() && self.bound_generation == Some(canvas.generation()) {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(params) = self.params_ubo.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        self.bind_group = Some(textured_quad_bind_group(
            ctx.device,
            "ledscope present bind group",
            bgl,
            params,
            canvas.view(),
            sampler,
        ));
        self.bound_generation = Some(canvas.generation());
    }
}
