use super::types::{InputEvent, Key, MouseWheelDelta};

/// Per-frame input deltas, cleared by the runtime after each redraw.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,
    /// Key presses this frame, repeats included, in order.
    pub keys_pressed: Vec<Key>,
}

/// Distances used to turn wheel notches and keys into pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollStep {
    pub line: f64,
    pub page: f64,
}

impl Default for ScrollStep {
    fn default() -> Self {
        Self { line: 40.0, page: 600.0 }
    }
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    /// Net change of the document scroll position requested this frame, in
    /// logical pixels (positive = further down the page).
    ///
    /// `Home`/`End` are absolute jumps and are not included.
    pub fn scroll_delta(&self, step: ScrollStep) -> f64 {
        let wheel: f64 = self
            .events
            .iter()
            .filter_map(|ev| match ev {
                InputEvent::MouseWheel(MouseWheelDelta::Line { y, .. }) => Some(-y * step.line),
                InputEvent::MouseWheel(MouseWheelDelta::Pixel { y, .. }) => Some(-y),
                _ => None,
            })
            .sum();

        let keys: f64 = self
            .keys_pressed
            .iter()
            .map(|k| match k {
                Key::ArrowDown => step.line,
                Key::ArrowUp => -step.line,
                Key::PageDown | Key::Space => step.page,
                Key::PageUp => -step.page,
                _ => 0.0,
            })
            .sum();

        wheel + keys
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_down_scrolls_forward() {
        let mut f = InputFrame::default();
        f.push_event(InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: -2.0 }));
        f.push_event(InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 0.0, y: 15.0 }));
        assert_eq!(f.scroll_delta(ScrollStep { line: 40.0, page: 600.0 }), 65.0);
    }

    #[test]
    fn navigation_keys_map_to_lines_and_pages() {
        let mut f = InputFrame::default();
        f.keys_pressed = vec![Key::PageDown, Key::ArrowUp, Key::Escape];
        assert_eq!(f.scroll_delta(ScrollStep::default()), 560.0);
    }

    #[test]
    fn clear_empties_everything() {
        let mut f = InputFrame::default();
        f.keys_pressed.push(Key::End);
        f.push_event(InputEvent::PointerLeft);
        f.clear();
        assert!(f.events.is_empty() && f.keys_pressed.is_empty());
    }
}
