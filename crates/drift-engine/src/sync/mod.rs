//! Layout → scene synchronization.
//!
//! [`SceneSync`] owns one [`BoundElement`] per tracked layout element and the
//! mesh created for it. Bounds are read at bind time and on resize only;
//! every tick re-derives mesh placements from the cached bounds and the
//! tick's [`ViewportFrame`](crate::coords::ViewportFrame).

mod binding;
mod hover;
mod placement;
mod scene;

pub use binding::{BindingId, BoundElement};
pub use hover::{HoverConfig, HoverState};
pub use placement::{place, screen_rect, Placement};
pub use scene::{Reposition, SceneSync};
