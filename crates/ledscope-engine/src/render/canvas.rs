use crate::composite::DrawingSurface;
use crate::coords::SurfaceSize;
use crate::error::{CompositeError, CompositeResult};

/// Pixel format of the canvas texture. Values are the strip bytes, unconverted.
pub const CANVAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Offscreen drawing surface the compositors render into.
///
/// The canvas texture is recreated on every size change; `generation` counts those
/// so samplers of the canvas (the presenter) know to rebind.
pub struct GpuCanvas {
    pub(super) device: wgpu::Device,
    pub(super) queue: wgpu::Queue,
    size: SurfaceSize,
    display_size: SurfaceSize,
    texture: wgpu::Texture,
    pub(super) view: wgpu::TextureView,
    generation: u64,
    /// RGB -> RGBA expansion buffer for uploads.
    pub(super) scratch: Vec<u8>,
}

impl GpuCanvas {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, size: SurfaceSize) -> Self {
        let size = clamp_size(device, size);
        let (texture, view) = create_canvas_texture(device, size);
        Self {
            device: device.clone(),
            queue: queue.clone(),
            size,
            display_size: size,
            texture,
            view,
            generation: 0,
            scratch: Vec::new(),
        }
    }

    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Fails with `UnsupportedSurface` when `size` cannot be a texture on this device.
    pub(super) fn check_texture_size(&self, size: SurfaceSize) -> CompositeResult<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if size.is_empty() || size.width > max || size.height > max {
            return Err(CompositeError::unsupported_surface(format!(
                "texture {}x{} exceeds device limit {max}",
                size.width, size.height
            )));
        }
        Ok(())
    }

    pub(super) fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }

    pub(super) fn submit(&self, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl DrawingSurface for GpuCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        let size = clamp_size(&self.device, size);
        if size == self.size {
            return;
        }
        let (texture, view) = create_canvas_texture(&self.device, size);
        self.texture.destroy();
        self.texture = texture;
        self.view = view;
        self.size = size;
        self.generation += 1;
        log::debug!("canvas resized to {}x{}", size.width, size.height);
    }

    fn display_size(&self) -> SurfaceSize {
        self.display_size
    }

    fn set_display_size(&mut self, size: SurfaceSize) {
        self.display_size = size;
    }
}

impl Drop for GpuCanvas {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

fn clamp_size(device: &wgpu::Device, size: SurfaceSize) -> SurfaceSize {
    let max = device.limits().max_texture_dimension_2d;
    SurfaceSize::new(size.width.clamp(1, max), size.height.clamp(1, max))
}

fn create_canvas_texture(device: &wgpu::Device, size: SurfaceSize) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("ledscope canvas"),
        size: wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: CANVAS_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
