//! ledscope engine.
//!
//! Turns LED strip geometry declarations and per-tick RGB frames into an image:
//!
//! - [`screen_map`]: per-strip pixel coordinates and their union bounds
//! - [`frame`]: per-tick strip colors and the latest-value store
//! - [`events`]: JSON geometry events from the device stream
//! - [`composite`]: the raster and scene compositors plus the [`composite::Visualizer`]
//!   session
//! - [`render`]: wgpu back-end for both compositors and the window presenter
//! - [`window`], [`core`], [`device`], [`time`]: paced winit + wgpu runtime

pub mod composite;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod events;
pub mod frame;
pub mod logging;
pub mod render;
pub mod screen_map;
pub mod time;
pub mod window;

pub use error::{CompositeError, CompositeResult};
