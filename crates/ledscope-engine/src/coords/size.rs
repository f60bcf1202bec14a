/// Pixel dimensions of a drawing surface or texture.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Each axis rounded up to the next power of two (GPU texture constraint).
    ///
    /// Zero rounds up to one. `None` when an axis exceeds `2^31`.
    #[inline]
    pub fn checked_next_power_of_two(self) -> Option<Self> {
        Some(Self {
            width: self.width.max(1).checked_next_power_of_two()?,
            height: self.height.max(1).checked_next_power_of_two()?,
        })
    }

    /// Number of bytes in a tightly packed buffer with `channels` bytes per pixel.
    #[inline]
    pub fn byte_len(self, channels: usize) -> usize {
        self.width as usize * self.height as usize * channels
    }

    /// `height / width`, or 1.0 when the size is empty.
    #[inline]
    pub fn aspect_ratio(self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.height as f32 / self.width as f32
        }
    }
}
