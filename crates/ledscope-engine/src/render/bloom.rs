use bytemuck::{Pod, Zeroable};

use crate::composite::BloomParams;
use crate::coords::SurfaceSize;
use crate::error::CompositeResult;

use super::canvas::{CANVAS_FORMAT, GpuCanvas};
use super::common::{color_attachment, create_uniform, sampler, triangle_list, uniform_binding_size};
use super::scene::GpuScene;

/// Texels between blur taps at radius 1.0.
const BLUR_SPREAD: f32 = 2.0;

/// Two-pass bloom over a scene texture.
///
/// Pass 1 blurs the thresholded scene horizontally into an intermediate texture.
/// Pass 2 blurs that vertically, scales it by the strength and adds it over the
/// scene into the canvas.
pub struct GpuBloom {
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    blur_texture: wgpu::Texture,
    blur_view: wgpu::TextureView,
    horizontal: wgpu::BindGroup,
    vertical: wgpu::BindGroup,
    params: BloomParams,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct BloomUniform {
    step: [f32; 2],
    strength: f32,
    threshold: f32,
}

impl BloomUniform {
    fn horizontal(params: &BloomParams, size: SurfaceSize) -> Self {
        Self {
            step: [params.radius * BLUR_SPREAD / size.width as f32, 0.0],
            strength: 1.0,
            threshold: params.threshold,
        }
    }

    fn vertical(params: &BloomParams, size: SurfaceSize) -> Self {
        Self {
            step: [0.0, params.radius * BLUR_SPREAD / size.height as f32],
            strength: params.strength,
            threshold: 0.0,
        }
    }
}

impl GpuBloom {
    pub(super) fn new(canvas: &GpuCanvas, scene: &GpuScene, params: &BloomParams) -> CompositeResult<Self> {
        let size = scene.size();
        canvas.check_texture_size(size)?;
        let device = &canvas.device;

        let blur_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ledscope bloom blur"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CANVAS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let blur_view = blur_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ledscope bloom shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/bloom.wgsl").into()),
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ledscope bloom bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_binding_size::<BloomUniform>(),
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ledscope bloom pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = |entry_point: &str, label: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(entry_point),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: CANVAS_FORMAT,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: triangle_list(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };
        let blur_pipeline = pipeline("fs_blur", "ledscope bloom blur pipeline");
        let composite_pipeline = pipeline("fs_composite", "ledscope bloom composite pipeline");

        let smp = sampler(device, "ledscope bloom sampler", wgpu::FilterMode::Linear);
        let bind_group = |label: &str, uniform: &wgpu::Buffer, src: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bgl,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(src),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&scene.target_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: wgpu::BindingResource::Sampler(&smp),
                    },
                ],
            })
        };

        let h_ubo = create_uniform(device, "ledscope bloom h ubo", &BloomUniform::horizontal(params, size));
        let v_ubo = create_uniform(device, "ledscope bloom v ubo", &BloomUniform::vertical(params, size));
        let horizontal = bind_group("ledscope bloom h bind group", &h_ubo, &scene.target_view);
        let vertical = bind_group("ledscope bloom v bind group", &v_ubo, &blur_view);

        log::debug!(
            "bloom composed: strength {}, radius {}, threshold {}",
            params.strength,
            params.radius,
            params.threshold
        );

        Ok(Self {
            blur_pipeline,
            composite_pipeline,
            blur_texture,
            blur_view,
            horizontal,
            vertical,
            params: *params,
        })
    }

    #[inline]
    pub fn params(&self) -> BloomParams {
        self.params
    }

    /// Records both bloom passes; the second writes `target`.
    pub(super) fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        self.pass(encoder, &self.blur_view, &self.blur_pipeline, &self.horizontal, "ledscope bloom h pass");
        self.pass(encoder, target, &self.composite_pipeline, &self.vertical, "ledscope bloom v pass");
    }

    fn pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        pipeline: &wgpu::RenderPipeline,
        bind_group: &wgpu::BindGroup,
        label: &str,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(color_attachment(view, true))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }
}

impl Drop for GpuBloom {
    fn drop(&mut self) {
        self.blur_texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_split_threshold_and_strength() {
        let params = BloomParams::default();
        let size = SurfaceSize::new(1280, 640);

        let h = BloomUniform::horizontal(&params, size);
        assert_eq!(h.step, [2.0 / 1280.0, 0.0]);
        assert_eq!(h.strength, 1.0);

        let v = BloomUniform::vertical(&params, size);
        assert_eq!(v.step, [0.0, 2.0 / 640.0]);
        assert_eq!(v.strength, 8.0);
        assert_eq!(v.threshold, 0.0);
    }
}
