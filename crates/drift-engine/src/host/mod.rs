//! Host page capabilities consumed by the sync core.
//!
//! The core never talks to a DOM or a windowing system directly. Element
//! geometry is read through [`LayoutSource`], and asynchronous host inputs
//! (scroll, resize, pointer, visibility) arrive as [`HostEvent`]s buffered in
//! an [`EventQueue`] and applied at the start of the next tick.

mod element;
mod events;

pub use element::{ElementHandle, LayoutSource};
pub use events::{EventKind, EventQueue, HostEvent, SubscriptionId};
