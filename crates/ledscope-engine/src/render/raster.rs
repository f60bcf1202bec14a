use crate::composite::RasterBackend;
use crate::coords::SurfaceSize;
use crate::error::CompositeResult;

use super::canvas::{CANVAS_FORMAT, GpuCanvas};
use super::common::{
    QuadParams, color_attachment, create_quad_buffers, create_uniform, sampler,
    textured_quad_bgl, textured_quad_bind_group, textured_quad_pipeline,
};

/// Pipeline, sampler and quad buffers of the raster back-end.
pub struct RasterProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
}

/// RGB raster texture (stored as RGBA8) and its bind group.
pub struct RasterTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    size: SurfaceSize,
}

impl Drop for RasterTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

impl RasterBackend for GpuCanvas {
    type Program = RasterProgram;
    type Texture = RasterTexture;

    fn create_program(&mut self) -> CompositeResult<RasterProgram> {
        let bind_group_layout = textured_quad_bgl(&self.device, "ledscope raster bgl");
        let pipeline = textured_quad_pipeline(
            &self.device,
            "ledscope raster pipeline",
            &bind_group_layout,
            CANVAS_FORMAT,
        );
        let (quad_vbo, quad_ibo) = create_quad_buffers(&self.device, "ledscope raster");
        let params_ubo = create_uniform(
            &self.device,
            "ledscope raster params ubo",
            &QuadParams {
                uv_scale: [1.0, 1.0],
                _pad: [0.0; 2],
            },
        );

        Ok(RasterProgram {
            pipeline,
            bind_group_layout,
            sampler: sampler(&self.device, "ledscope raster sampler", wgpu::FilterMode::Nearest),
            params_ubo,
            quad_vbo,
            quad_ibo,
        })
    }

    fn create_texture(
        &mut self,
        program: &RasterProgram,
        size: SurfaceSize,
    ) -> CompositeResult<RasterTexture> {
        self.check_texture_size(size)?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ledscope raster texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = textured_quad_bind_group(
            &self.device,
            "ledscope raster bind group",
            &program.bind_group_layout,
            &program.params_ubo,
            &view,
            &program.sampler,
        );

        Ok(RasterTexture {
            texture,
            bind_group,
            size,
        })
    }

    fn upload_rgb(&mut self, texture: &RasterTexture, size: SurfaceSize, rgb: &[u8]) {
        debug_assert_eq!(texture.size, size);
        expand_rgb(rgb, &mut self.scratch);
        if self.scratch.len() != size.byte_len(4) {
            log::warn!(
                "raster upload of {} bytes does not match {}x{}",
                rgb.len(),
                size.width,
                size.height
            );
            return;
        }

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.scratch,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size.width * 4),
                rows_per_image: Some(size.height),
            },
            extent(size),
        );
    }

    fn draw_quad(&mut self, program: &RasterProgram, texture: &RasterTexture, uv_scale: [f32; 2]) {
        self.queue.write_buffer(
            &program.params_ubo,
            0,
            bytemuck::bytes_of(&QuadParams {
                uv_scale,
                _pad: [0.0; 2],
            }),
        );

        let mut encoder = self.encoder("ledscope raster encoder");
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ledscope raster pass"),
                color_attachments: &[Some(color_attachment(&self.view, true))],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&program.pipeline);
            rpass.set_bind_group(0, &texture.bind_group, &[]);
            rpass.set_vertex_buffer(0, program.quad_vbo.slice(..));
            rpass.set_index_buffer(program.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..6, 0, 0..1);
        }
        self.submit(encoder);
    }
}

fn extent(size: SurfaceSize) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// Packs RGB triples into opaque RGBA; wgpu has no 3-channel 8-bit format.
fn expand_rgb(rgb: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        out.extend_from_slice(&[px[0], px[1], px[2], 255]);
    }
}
