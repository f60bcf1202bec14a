//! Screen map: per-strip LED geometry in one shared coordinate space.
//!
//! Geometry is declared per strip (pixel index -> physical coordinate) and merged into
//! absolute bounds that size every compositor. Compositors never receive change
//! notifications; they compare [`GeometryVersion`]s at the top of each frame.

mod geometry;
mod registry;
mod version;

pub use geometry::{ScreenMap, StripGeometry, StripId};
pub use registry::ScreenMapRegistry;
pub use version::GeometryVersion;
