//! Window and paced render loop.
//!
//! Owns the `winit` event loop and window, and wires them to the GPU layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
