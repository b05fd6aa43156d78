//! Frame timing.
//!
//! One `FrameClock` per window; `tick()` once per redraw yields the clamped
//! `FrameTime` the frame loop consumes.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
