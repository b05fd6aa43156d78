//! Coordinate and geometry types shared by the sync core and renderers.
//!
//! Two spaces meet here:
//! - layout space: logical pixels, origin top-left, +X right, +Y down
//!   (the space element bounding boxes are reported in)
//! - scene space: logical pixels, origin at the viewport center, +X right, +Y up
//!   (the space meshes are placed in)
//!
//! `sync::placement` is the only place that converts between the two.

mod bounds;
mod vec2;
mod viewport;

pub use bounds::Bounds;
pub use vec2::Vec2;
pub use viewport::ViewportFrame;
