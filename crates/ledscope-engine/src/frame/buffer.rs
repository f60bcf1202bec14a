use crate::screen_map::StripId;

/// One RGB color sample.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mean of the three channels normalized to `[0, 1]`.
    #[inline]
    pub fn brightness(self) -> f32 {
        (self.r as f32 + self.g as f32 + self.b as f32) / (3.0 * 255.0)
    }

    /// Channels normalized to `[0, 1]`.
    #[inline]
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Color bytes for one strip in one tick.
///
/// `colors` is packed RGB; a trailing partial triple is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StripFrame {
    pub strip_id: StripId,
    pub colors: Vec<u8>,
}

impl StripFrame {
    pub fn new(strip_id: StripId, colors: Vec<u8>) -> Self {
        Self { strip_id, colors }
    }

    /// Builds a frame from color samples.
    pub fn from_pixels(strip_id: StripId, pixels: impl IntoIterator<Item = Rgb>) -> Self {
        let colors = pixels.into_iter().flat_map(|c| [c.r, c.g, c.b]).collect();
        Self { strip_id, colors }
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.colors.len() / 3
    }

    /// Pixels in index order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
    }
}

/// Ordered strip frames for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    strips: Vec<StripFrame>,
}

impl FrameBuffer {
    pub fn new(strips: Vec<StripFrame>) -> Self {
        Self { strips }
    }

    #[inline]
    pub fn strips(&self) -> &[StripFrame] {
        &self.strips
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strips.len()
    }

    /// Sum of pixel counts over all strips.
    pub fn total_pixels(&self) -> usize {
        self.strips.iter().map(StripFrame::pixel_count).sum()
    }
}

impl FromIterator<StripFrame> for FrameBuffer {
    fn from_iter<I: IntoIterator<Item = StripFrame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_partial_triple_is_ignored() {
        let strip = StripFrame::new(0, vec![1, 2, 3, 4, 5]);
        assert_eq!(strip.pixel_count(), 1);
        assert_eq!(strip.pixels().collect::<Vec<_>>(), vec![Rgb::new(1, 2, 3)]);
    }

    #[test]
    fn brightness_is_mean_of_normalized_channels() {
        assert_eq!(Rgb::new(255, 255, 255).brightness(), 1.0);
        assert_eq!(Rgb::BLACK.brightness(), 0.0);
        let b = Rgb::new(255, 0, 0).brightness();
        assert!((b - 1.0 / 3.0).abs() < 1e-6);
    }
}
