use crate::anim::{Ease, Tween};
use crate::coords::Vec2;

/// Hover fade parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverConfig {
    /// Seconds for `hoverState` to travel 0 → 1 (and back).
    pub duration: f64,
    pub ease: Ease,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            ease: Ease::QuadOut,
        }
    }
}

/// Pointer interaction state of one bound element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverState {
    /// Last pointer position over the mesh, in plane UV (bottom-left origin).
    /// Kept after the pointer leaves so the fade-out ripples from the exit point.
    pub uv: Vec2,
    pub inside: bool,
    tween: Tween,
}

impl HoverState {
    pub fn new(config: HoverConfig) -> Self {
        Self {
            uv: Vec2::new(0.5, 0.5),
            inside: false,
            tween: Tween::new(0.0, config.duration, config.ease),
        }
    }

    pub fn enter(&mut self, uv: Vec2) {
        self.uv = uv;
        if !self.inside {
            self.inside = true;
            self.tween.retarget(1.0);
        }
    }

    pub fn leave(&mut self) {
        if self.inside {
            self.inside = false;
            self.tween.retarget(0.0);
        }
    }

    /// Current `hoverState` value in `[0,1]`.
    pub fn level(&self) -> f64 {
        self.tween.value()
    }

    pub fn advance(&mut self, dt: f64) -> f64 {
        self.tween.advance(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_then_leave_fades_back_to_zero() {
        let mut h = HoverState::new(HoverConfig { duration: 1.0, ease: Ease::Linear });
        h.enter(Vec2::new(0.2, 0.8));
        assert_eq!(h.advance(0.5), 0.5);
        h.leave();
        assert_eq!(h.advance(0.25), 0.375);
        assert_eq!(h.advance(10.0), 0.0);
        assert_eq!(h.uv, Vec2::new(0.2, 0.8));
    }

    #[test]
    fn moving_inside_updates_uv_without_restarting_fade() {
        let mut h = HoverState::new(HoverConfig { duration: 1.0, ease: Ease::Linear });
        h.enter(Vec2::new(0.1, 0.1));
        h.advance(0.5);
        h.enter(Vec2::new(0.9, 0.9));
        assert_eq!(h.advance(0.25), 0.75);
        assert_eq!(h.uv, Vec2::new(0.9, 0.9));
    }
}
