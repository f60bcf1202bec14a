//! wgpu implementation of the compositing back-ends.
//!
//! [`GpuCanvas`] is an offscreen RGBA8 texture implementing both `RasterBackend` and
//! `SceneBackend`; [`CanvasPresenter`] draws it into the window.
//!
//! Conventions:
//! - raster and canvas coordinates are top-left origin, +Y down
//! - scene coordinates are centered, +Y up, in render pixels

mod bloom;
mod canvas;
mod common;
mod ctx;
mod present;
mod raster;
mod scene;

pub use bloom::GpuBloom;
pub use canvas::{CANVAS_FORMAT, GpuCanvas};
pub use ctx::{RenderCtx, RenderTarget};
pub use present::CanvasPresenter;
pub use raster::{RasterProgram, RasterTexture};
pub use scene::{DiskHandle, GpuScene};
