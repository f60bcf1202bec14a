use super::SurfaceSize;

/// Viewport size in logical pixels.
///
/// The presenter uses it to fit a canvas of a given display size into the window.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Largest rect with the aspect ratio of `content` that fits inside the viewport,
    /// centered. Returned as `(x, y, w, h)` in viewport units.
    ///
    /// Content is never scaled past its own display size.
    pub fn fit(self, content: SurfaceSize) -> (f32, f32, f32, f32) {
        if !self.is_valid() || content.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let cw = content.width as f32;
        let ch = content.height as f32;
        let scale = (self.width / cw).min(self.height / ch).min(1.0);
        let w = cw * scale;
        let h = ch * scale;
        ((self.width - w) * 0.5, (self.height - h) * 0.5, w, h)
    }
}
