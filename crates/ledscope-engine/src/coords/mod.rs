//! Coordinate and geometry types shared by the screen map, compositors and renderers.
//!
//! Screen-map space:
//! - physical LED coordinates as declared by the device, arbitrary origin
//! - float valued; compositors translate by the absolute minimum before use
//!
//! Canvas space:
//! - integer pixels, origin top-left, +X right, +Y down

mod bounds;
mod size;
mod vec2;
mod viewport;

pub use bounds::Bounds;
pub use size::SurfaceSize;
pub use vec2::Vec2;
pub use viewport::Viewport;
