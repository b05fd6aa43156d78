use std::fmt;

use crate::coords::Bounds;

/// Non-owning reference to a layout element owned by the host page.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read access to the host's layout.
///
/// Reading bounding boxes may force a synchronous layout on real hosts; the
/// sync core only calls [`bounding_box`](LayoutSource::bounding_box) at bind
/// time and once per resize.
pub trait LayoutSource {
    /// Elements matching `selector`, in document order.
    fn query_elements(&self, selector: &str) -> Vec<ElementHandle>;

    /// Current bounding box in page coordinates, or `None` if the element is gone.
    fn bounding_box(&self, element: ElementHandle) -> Option<Bounds>;

    /// Key of the image the element displays, as registered with the preload barrier.
    fn image_source(&self, element: ElementHandle) -> Option<String>;
}

impl<T: LayoutSource + ?Sized> LayoutSource for &T {
    fn query_elements(&self, selector: &str) -> Vec<ElementHandle> {
        (**self).query_elements(selector)
    }

    fn bounding_box(&self, element: ElementHandle) -> Option<Bounds> {
        (**self).bounding_box(element)
    }

    fn image_source(&self, element: ElementHandle) -> Option<String> {
        (**self).image_source(element)
    }
}
