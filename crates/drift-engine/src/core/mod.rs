//! Contracts between the platform runtime and applications.
//!
//! The runtime owns windows, GPU contexts and clocks; applications see them
//! only through [`FrameCtx`] once per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
