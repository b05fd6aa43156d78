//! Scroll smoothing.
//!
//! Turns raw scroll samples into a lagging `current` position (used for layout)
//! and a velocity estimate (used to drive the distortion pass).

mod tracker;

pub use tracker::{ScrollConfig, ScrollState, ScrollTracker};
