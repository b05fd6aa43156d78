/// Keys the page navigation cares about.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    /// Any other key, with its platform code when available.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse wheel delta; positive `y` scrolls toward the top of the page.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    /// Notched wheels, in lines.
    Line { x: f64, y: f64 },
    /// Touchpads, in logical pixels.
    Pixel { x: f64, y: f64 },
}

/// Platform-agnostic input events. Positions are logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    MouseWheel(MouseWheelDelta),
    Key { key: Key, state: KeyState, repeat: bool },
    Focused(bool),
    /// Window fully hidden (minimized, covered) or shown again.
    Occluded(bool),
}
