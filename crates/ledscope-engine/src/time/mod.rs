//! Frame pacing.
//!
//! One `FramePacer` per render loop; the runtime asks it whether a frame is due and
//! hands the resulting `FrameTime` to the app.

mod pacer;

pub use pacer::{FramePacer, FrameTime};
