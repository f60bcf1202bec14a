//! Frame compositing.
//!
//! Two interchangeable back-ends turn a [`FrameBuffer`](crate::frame::FrameBuffer) plus
//! a [`ScreenMap`](crate::screen_map::ScreenMap) into pixels on a drawing surface:
//!
//! - [`RasterCompositor`]: CPU RGB raster, uploaded to one texture, drawn as one quad.
//!   Overdraw policy: last write wins.
//! - [`SceneCompositor`]: one persistent disk per mapped pixel plus a bloom pass.
//!   Overdraw policy: brightest pixel per coordinate wins.
//!
//! Both share the [`FrameCompositor`] contract and are selected once through
//! [`Compositor`]. GPU work goes through the [`RasterBackend`] / [`SceneBackend`]
//! capability traits; `crate::render::GpuCanvas` implements both with wgpu.

mod backend;
mod compositor;
mod layout;
mod raster;
mod scene;
mod visualizer;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BloomParams, DiskDesc, DrawingSurface, RasterBackend, SceneBackend, SceneDesc};
pub use compositor::{Compositor, CompositorKind, FrameCompositor, FrameStats};
pub use layout::{SceneLayout, display_size_for};
pub use raster::RasterCompositor;
pub use scene::SceneCompositor;
pub use visualizer::Visualizer;

/// CSS-style visible width of the canvas; height follows the aspect ratio.
pub const DISPLAY_WIDTH: u32 = 640;
