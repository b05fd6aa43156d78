//! Drift engine crate.
//!
//! Keeps textured plane meshes aligned with the image elements of a scrolling
//! layout and runs a velocity-driven distortion pass over the rendered scene.
//! The platform + GPU runtime pieces (device, window, input, frame clock)
//! live here too so hosts only supply a layout and assets.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;

pub mod anim;
pub mod distortion;
pub mod error;
pub mod frame_loop;
pub mod host;
pub mod preload;
pub mod scroll;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::{PreloadFailure, SyncError, SyncResult};
