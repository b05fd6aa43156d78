use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Current input state for a single window.
#[derive(Debug, Default)]
pub struct InputState {
    pub focused: bool,
    pub occluded: bool,
    /// Pointer position in logical pixels; `None` outside the window.
    pub pointer_pos: Option<(f64, f64)>,
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies `ev` and records per-frame transitions into `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            InputEvent::PointerMoved { x, y } => self.pointer_pos = Some((x, y)),
            InputEvent::PointerLeft => self.pointer_pos = None,
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Avoid stuck keys when focus changes mid-press.
                    self.keys_down.clear();
                }
            }
            InputEvent::Occluded(o) => self.occluded = o,
            InputEvent::Key { key, state, repeat } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) || repeat {
                        frame.keys_pressed.push(key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
            InputEvent::MouseWheel(_) => {}
        }
        frame.push_event(ev);
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
