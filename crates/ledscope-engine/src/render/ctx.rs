use crate::coords::{SurfaceSize, Viewport};

/// What a draw callback needs from the window: device handles, the swapchain format
/// and the window size.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Window size in logical pixels.
    pub viewport: Viewport,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
        scale_factor: f32,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
            scale_factor,
        }
    }

    /// Physical-pixel rect `[x, y, w, h]` that shows content of `display` size,
    /// fitted and centered in the window. `None` when less than a pixel would show.
    pub fn content_rect(&self, display: SurfaceSize) -> Option<[f32; 4]> {
        fit_physical(self.viewport, self.scale_factor, display)
    }
}

fn fit_physical(viewport: Viewport, scale: f32, display: SurfaceSize) -> Option<[f32; 4]> {
    let (x, y, w, h) = viewport.fit(display);
    let rect = [x * scale, y * scale, w * scale, h * scale];
    (rect[2] >= 1.0 && rect[3] >= 1.0).then_some(rect)
}

/// Encoder and swapchain view for the frame being drawn.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(encoder: &'a mut wgpu::CommandEncoder, color_view: &'a wgpu::TextureView) -> Self {
        Self { encoder, color_view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_scales_to_physical_pixels() {
        let rect = fit_physical(Viewport::new(800.0, 600.0), 2.0, SurfaceSize::new(640, 320));
        assert_eq!(rect, Some([160.0, 280.0, 1280.0, 640.0]));
    }

    #[test]
    fn collapsed_window_shows_nothing() {
        assert_eq!(fit_physical(Viewport::new(0.0, 600.0), 1.0, SurfaceSize::new(640, 320)), None);
        assert_eq!(fit_physical(Viewport::new(0.5, 0.5), 1.0, SurfaceSize::new(640, 320)), None);
    }
}
