use crate::screen_map::StripId;

pub type CompositeResult<T> = Result<T, CompositeError>;

/// Failures and anomalies raised while declaring geometry or compositing frames.
///
/// Only `NoGeometry`, `UnsupportedSurface`, `InvalidGeometry` and `InvalidEvent` are
/// returned to callers. The per-strip and per-pixel variants are formatted into
/// warnings by the compositors, which then skip the offending input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    #[error("strip {strip_id}: screen map is empty")]
    InvalidGeometry { strip_id: StripId },

    #[error("no strip geometry has been declared")]
    NoGeometry,

    #[error("no screen map found for strip {strip_id}, skipping update")]
    MissingStripGeometry { strip_id: StripId },

    #[error("strip {strip_id}: pixel {index} is outside the screen map of {map_len} entries")]
    PixelIndexOutOfRange {
        strip_id: StripId,
        index: usize,
        map_len: usize,
    },

    #[error("strip {strip_id}: pixel {index} is outside the canvas at ({x}, {y})")]
    PixelOutOfCanvas {
        strip_id: StripId,
        index: usize,
        x: i64,
        y: i64,
    },

    #[error("received empty frame data, skipping update")]
    EmptyFrame,

    #[error("drawing surface unavailable: {0}")]
    UnsupportedSurface(String),

    #[error("invalid strip event: {0}")]
    InvalidEvent(String),
}

impl CompositeError {
    pub fn unsupported_surface(msg: impl Into<String>) -> Self {
        Self::UnsupportedSurface(msg.into())
    }

    pub fn invalid_event(msg: impl Into<String>) -> Self {
        Self::InvalidEvent(msg.into())
    }

    /// True for errors that end the session for the current surface.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NoGeometry | Self::UnsupportedSurface(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_strip() {
        let err = CompositeError::MissingStripGeometry { strip_id: 5 };
        assert!(err.to_string().contains("strip 5"));

        let err = CompositeError::PixelOutOfCanvas { strip_id: 2, index: 7, x: -1, y: 3 };
        assert!(err.to_string().contains("(-1, 3)"));
    }

    #[test]
    fn only_session_preconditions_are_fatal() {
        assert!(CompositeError::NoGeometry.is_fatal());
        assert!(CompositeError::unsupported_surface("no adapter").is_fatal());
        assert!(!CompositeError::EmptyFrame.is_fatal());
        assert!(!CompositeError::MissingStripGeometry { strip_id: 0 }.is_fatal());
    }
}
