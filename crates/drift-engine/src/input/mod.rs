//! Input subsystem.
//!
//! Public API is platform-agnostic; the runtime translates winit events into
//! [`InputEvent`]s. Only what a scrolling image page reacts to is modelled:
//! pointer motion, wheel, navigation keys, focus and occlusion.

mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use frame::{InputFrame, ScrollStep};
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, MouseWheelDelta};
