//! The per-refresh tick that drives scroll smoothing, mesh placement and the
//! distortion pass.
//!
//! [`FrameLoop`] owns every piece of cross-tick state (tracker, bindings,
//! event queue, preload barrier); the renderer is handed in on each tick.

mod config;
mod runner;

pub use config::LoopConfig;
pub use runner::{FrameLoop, LoopState, TickOutcome, TickReport};
