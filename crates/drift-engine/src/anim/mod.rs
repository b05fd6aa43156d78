//! Scalar easing for discrete state transitions (hover fade-in/out).

mod tween;

pub use tween::{Ease, Tween};
