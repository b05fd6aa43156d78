use std::time::Duration;

use crate::host::ElementHandle;

/// Convenience result type used by the sync core.
pub type SyncResult<T> = Result<T, SyncError>;

/// Error taxonomy of the scroll-sync pipeline.
///
/// Structural problems (binding, preconditions, assets) surface loudly at
/// bind time. Numeric degeneracy is never reported here: it is absorbed by
/// skipping the affected reposition.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// The element has no renderable geometry. Fatal for that element only.
    #[error("element {element} has no renderable geometry ({width}x{height})")]
    Binding {
        element: ElementHandle,
        width: f64,
        height: f64,
    },

    /// Binding was attempted before the preload barrier resolved.
    #[error("bind attempted before asset preload completed")]
    Precondition,

    /// The element's image source was never preloaded.
    #[error("element {element} references unknown image source {source_key:?}")]
    MissingAsset {
        element: ElementHandle,
        source_key: Option<String>,
    },

    /// The preload barrier failed, timed out, or was cancelled.
    #[error(transparent)]
    Preload(#[from] PreloadFailure),

    /// Renderer capability failure.
    #[error("renderer error: {0:#}")]
    Render(#[from] anyhow::Error),
}

impl SyncError {
    pub fn binding(element: ElementHandle, width: f64, height: f64) -> Self {
        Self::Binding { element, width, height }
    }

    /// Per-element errors leave the rest of the batch intact.
    pub fn is_per_element(&self) -> bool {
        matches!(self, Self::Binding { .. } | Self::MissingAsset { .. })
    }
}

/// Terminal outcome of a preload barrier that did not become ready.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PreloadFailure {
    #[error("asset {name:?} failed to load: {reason}")]
    Asset { name: String, reason: String },

    #[error("asset preload timed out after {0:?}")]
    TimedOut(Duration),

    #[error("asset preload cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_message_names_element() {
        let e = SyncError::binding(ElementHandle(7), 0.0, 40.0);
        assert_eq!(e.to_string(), "element #7 has no renderable geometry (0x40)");
        assert!(e.is_per_element());
    }

    #[test]
    fn preload_failure_is_transparent() {
        let e: SyncError = PreloadFailure::Cancelled.into();
        assert_eq!(e.to_string(), "asset preload cancelled");
        assert!(!e.is_per_element());
    }
}
