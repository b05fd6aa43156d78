use crate::coords::Bounds;
use crate::host::ElementHandle;
use crate::render::MeshId;

use super::hover::HoverState;

/// Index of a binding inside its [`SceneSync`](super::SceneSync).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BindingId(pub usize);

/// One tracked layout element and the mesh that mirrors it.
#[derive(Debug, Clone)]
pub struct BoundElement {
    /// Non-owning reference into the host layout.
    pub source: ElementHandle,
    /// Cached bounds; refreshed on resize only.
    pub bounds: Bounds,
    /// Owned by the `SceneSync`; destroyed on unbind.
    pub mesh: MeshId,
    pub hover: HoverState,
}
