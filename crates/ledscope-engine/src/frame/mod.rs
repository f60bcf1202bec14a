//! Per-tick pixel input.
//!
//! A [`FrameBuffer`] is rebuilt by the host every tick from the latest strip data,
//! usually through a [`StripFrameStore`].

mod buffer;
mod store;

pub use buffer::{FrameBuffer, Rgb, StripFrame};
pub use store::{StripFrameStore, StripInfo};
