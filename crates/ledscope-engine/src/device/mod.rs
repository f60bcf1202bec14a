//! GPU device and swapchain management.
//!
//! Creates the wgpu adapter/device/queue, configures the window surface, and hands
//! out per-frame encoders.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction};
pub use init::GpuInit;
