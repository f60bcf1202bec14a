use bytemuck::{Pod, Zeroable};

use crate::composite::{BloomParams, DiskDesc, SceneBackend, SceneDesc};
use crate::coords::{SurfaceSize, Vec2};
use crate::error::CompositeResult;

use super::bloom::GpuBloom;
use super::canvas::{CANVAS_FORMAT, GpuCanvas};
use super::common::{
    QuadVertex, ViewportUniform, color_attachment, create_quad_buffers, create_uniform,
    premul_alpha_blend, triangle_list, uniform_binding_size,
};

/// Disk scene: instance data, the disk pipeline and the texture it renders into.
pub struct GpuScene {
    size: SurfaceSize,
    target: wgpu::Texture,
    pub(super) target_view: wgpu::TextureView,

    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    instances: Vec<DiskInstance>,
    disposed: usize,
    dirty: bool,
    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

/// Index of a disk in its scene.
#[derive(Debug)]
pub struct DiskHandle(usize);

impl GpuScene {
    #[inline]
    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    #[inline]
    pub fn disk_count(&self) -> usize {
        self.instances.len() - self.disposed
    }

    fn ensure_instance_capacity(&mut self, device: &wgpu::Device, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }
        let new_cap = required.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<DiskInstance>()) as u64;
        self.instance_vbo = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ledscope disk instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
        self.dirty = true;
    }

    fn draw(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder) {
        let count = self.instances.len();
        if count > 0 {
            self.ensure_instance_capacity(device, count);
        }
        if self.dirty {
            if let Some(vbo) = self.instance_vbo.as_ref() {
                queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.instances));
            }
            self.dirty = false;
        }

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("ledscope disk pass"),
            color_attachments: &[Some(color_attachment(&self.target_view, true))],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };
        if count == 0 {
            return;
        }

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..count as u32);
    }
}

impl Drop for GpuScene {
    fn drop(&mut self) {
        self.target.destroy();
    }
}

impl SceneBackend for GpuCanvas {
    type Scene = GpuScene;
    type Disk = DiskHandle;
    type Bloom = GpuBloom;

    fn create_scene(&mut self, desc: &SceneDesc) -> CompositeResult<GpuScene> {
        self.check_texture_size(desc.size)?;
        let device = &self.device;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ledscope scene target"),
            size: wgpu::Extent3d {
                width: desc.size.width,
                height: desc.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CANVAS_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ledscope disk shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/disk.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ledscope disk bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: uniform_binding_size::<ViewportUniform>(),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ledscope disk pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ledscope disk pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), DiskInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: CANVAS_FORMAT,
                    blend: Some(premul_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: triangle_list(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let viewport_ubo = create_uniform(
            device,
            "ledscope disk viewport ubo",
            &ViewportUniform {
                viewport: [desc.size.width as f32, desc.size.height as f32],
                _pad: [0.0; 2],
            },
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ledscope disk bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let (quad_vbo, quad_ibo) = create_quad_buffers(device, "ledscope disk");

        Ok(GpuScene {
            size: desc.size,
            target,
            target_view,
            pipeline,
            bind_group,
            quad_vbo,
            quad_ibo,
            instances: Vec::new(),
            disposed: 0,
            dirty: true,
            instance_vbo: None,
            instance_capacity: 0,
        })
    }

    fn create_disk(&mut self, scene: &mut GpuScene, disk: &DiskDesc) -> DiskHandle {
        scene.instances.push(DiskInstance::new(disk.center, disk.radius, disk.color));
        scene.dirty = true;
        DiskHandle(scene.instances.len() - 1)
    }

    fn update_disk(&mut self, scene: &mut GpuScene, disk: &DiskHandle, center: Vec2, color: [f32; 3]) {
        let Some(inst) = scene.instances.get_mut(disk.0) else { return };
        inst.center_radius[0] = center.x;
        inst.center_radius[1] = center.y;
        inst.color = [color[0], color[1], color[2], 1.0];
        scene.dirty = true;
    }

    fn dispose_disk(&mut self, scene: &mut GpuScene, disk: DiskHandle) {
        let Some(inst) = scene.instances.get_mut(disk.0) else { return };
        // zero radius is discarded by the shader
        inst.center_radius[2] = 0.0;
        scene.disposed += 1;
        scene.dirty = true;
        if scene.disposed == scene.instances.len() {
            scene.instances.clear();
            scene.disposed = 0;
        }
    }

    fn compose_bloom(&mut self, scene: &GpuScene, params: &BloomParams) -> CompositeResult<GpuBloom> {
        GpuBloom::new(self, scene, params)
    }

    fn render(&mut self, scene: &mut GpuScene, bloom: &mut GpuBloom) {
        let mut encoder = self.encoder("ledscope scene encoder");
        scene.draw(&self.device, &self.queue, &mut encoder);
        bloom.encode(&mut encoder, &self.view);
        self.submit(encoder);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (32 bytes):
///
///  offset  0  center_radius [f32; 4]  loc 1  (.xy = center, .z = radius)
///  offset 16  color         [f32; 4]  loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct DiskInstance {
    center_radius: [f32; 4],
    color: [f32; 4],
}

impl DiskInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x4, // center_radius
        2 => Float32x4  // color
    ];

    fn new(center: Vec2, radius: f32, color: [f32; 3]) -> Self {
        Self {
            center_radius: [center.x, center.y, radius.max(0.0), 0.0],
            color: [color[0], color[1], color[2], 1.0],
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DiskInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
