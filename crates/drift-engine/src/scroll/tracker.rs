/// Smoothing parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollConfig {
    /// Fraction of the remaining gap closed per tick, in (0, 1).
    /// Higher is snappier, lower trails further behind the raw input.
    pub smoothing: f64,

    /// Velocity magnitude clamp, in logical pixels.
    pub max_velocity: f64,

    /// Gap below which `current` snaps to `target` and velocity reads zero.
    pub rest_epsilon: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            max_velocity: 400.0,
            rest_epsilon: 0.01,
        }
    }
}

impl ScrollConfig {
    pub fn smoothing(mut self, v: f64) -> Self {
        self.smoothing = v;
        self
    }

    pub fn max_velocity(mut self, v: f64) -> Self {
        self.max_velocity = v;
        self
    }

    pub fn rest_epsilon(mut self, v: f64) -> Self {
        self.rest_epsilon = v;
        self
    }

    fn sanitized(self) -> Self {
        let smoothing = if self.smoothing.is_finite() {
            self.smoothing.clamp(f64::EPSILON, 1.0)
        } else {
            ScrollConfig::default().smoothing
        };
        let max_velocity = if self.max_velocity.is_finite() && self.max_velocity >= 0.0 {
            self.max_velocity
        } else {
            f64::MAX
        };
        Self {
            smoothing,
            max_velocity,
            rest_epsilon: self.rest_epsilon.max(0.0),
        }
    }
}

/// Snapshot of the tracker after an update.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ScrollState {
    /// Smoothed position used to place meshes.
    pub current: f64,
    /// Latest raw sample.
    pub target: f64,
    /// Signed speed proxy: the lag between `target` and `current`, clamped.
    pub velocity: f64,
}

/// Single-pole low-pass filter over raw scroll samples.
///
/// The gap between the raw input and the smoothed position doubles as the
/// velocity signal, so no numerical differentiation is involved.
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    config: ScrollConfig,
    state: ScrollState,
}

impl ScrollTracker {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config: config.sanitized(),
            state: ScrollState::default(),
        }
    }

    pub fn config(&self) -> ScrollConfig {
        self.config
    }

    /// Last computed state.
    pub fn state(&self) -> ScrollState {
        self.state
    }

    /// Feeds one raw sample and advances the filter by one tick.
    ///
    /// Velocity is derived from the gap measured before `current` moves; it
    /// equals `target - current` after the move, clamped to `max_velocity`.
    /// Non-finite samples are ignored and the previous target is kept.
    pub fn update(&mut self, raw_scroll: f64) -> ScrollState {
        if raw_scroll.is_finite() {
            self.state.target = raw_scroll;
        } else {
            log::debug!("ignoring non-finite scroll sample {raw_scroll}");
        }

        let s = self.config.smoothing;
        let gap = self.state.target - self.state.current;

        self.state.velocity = (gap * (1.0 - s)).clamp(-self.config.max_velocity, self.config.max_velocity);
        self.state.current += gap * s;

        if (self.state.target - self.state.current).abs() < self.config.rest_epsilon {
            self.state.current = self.state.target;
            self.state.velocity = 0.0;
        }

        self.state
    }

    /// Moves all state to `position` at once (no trailing motion, zero velocity).
    pub fn jump_to(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        self.state = ScrollState {
            current: position,
            target: position,
            velocity: 0.0,
        };
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new(ScrollConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(smoothing: f64) -> ScrollTracker {
        ScrollTracker::new(ScrollConfig {
            smoothing,
            max_velocity: 1.0e9,
            rest_epsilon: 0.0,
        })
    }

    #[test]
    fn first_update_follows_single_pole_formula() {
        let mut t = tracker(0.1);
        let s = t.update(100.0);
        assert_eq!(s.target, 100.0);
        assert!((s.current - 10.0).abs() < 1e-12);
        assert!((s.velocity - 90.0).abs() < 1e-12);
    }

    #[test]
    fn velocity_equals_remaining_lag() {
        let mut t = tracker(0.25);
        for raw in [40.0, 90.0, 90.0, 10.0, 300.0] {
            let s = t.update(raw);
            assert!((s.velocity - (s.target - s.current)).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_input_converges_for_any_smoothing() {
        for smoothing in [0.01, 0.1, 0.5, 0.9, 0.999] {
            let mut t = tracker(smoothing);
            let mut s = ScrollState::default();
            for _ in 0..5_000 {
                s = t.update(1234.5);
            }
            assert!((s.current - 1234.5).abs() < 1e-6, "smoothing {smoothing}: {s:?}");
            assert!(s.velocity.abs() < 1e-6, "smoothing {smoothing}: {s:?}");
        }
    }

    #[test]
    fn velocity_sign_matches_gap_every_tick() {
        let mut t = tracker(0.1);
        let samples = [0.0, 50.0, 400.0, 390.0, -200.0, -200.0, 10.0, 10.0, 800.0];
        for raw in samples.iter().cycle().take(90) {
            let before = t.state();
            let gap = raw - before.current;
            let s = t.update(*raw);
            if gap == 0.0 {
                assert_eq!(s.velocity, 0.0);
            } else {
                assert_eq!(s.velocity.signum(), gap.signum(), "raw {raw}, before {before:?}");
            }
        }
    }

    #[test]
    fn velocity_is_clamped() {
        let mut t = ScrollTracker::new(ScrollConfig::default().max_velocity(25.0));
        let s = t.update(10_000.0);
        assert_eq!(s.velocity, 25.0);
        let mut t = ScrollTracker::new(ScrollConfig::default().max_velocity(25.0));
        let s = t.update(-10_000.0);
        assert_eq!(s.velocity, -25.0);
    }

    #[test]
    fn settles_exactly_within_rest_epsilon() {
        let mut t = ScrollTracker::default();
        let mut s = ScrollState::default();
        for _ in 0..500 {
            s = t.update(300.0);
        }
        assert_eq!(s.current, 300.0);
        assert_eq!(s.velocity, 0.0);
    }

    #[test]
    fn wide_rest_epsilon_snaps_early() {
        let config = ScrollConfig::default().smoothing(0.5).rest_epsilon(60.0);
        assert_eq!(config.rest_epsilon, 60.0);

        let mut t = ScrollTracker::new(config);
        let s = t.update(100.0);
        assert_eq!(s, ScrollState { current: 100.0, target: 100.0, velocity: 0.0 });

        let mut t = ScrollTracker::new(ScrollConfig::default().smoothing(0.5));
        assert_eq!(t.update(100.0).current, 50.0);
    }

    #[test]
    fn non_finite_sample_keeps_previous_target() {
        let mut t = tracker(0.5);
        t.update(100.0);
        let s = t.update(f64::NAN);
        assert_eq!(s.target, 100.0);
        assert!(s.current.is_finite());
    }

    #[test]
    fn jump_to_resets_lag() {
        let mut t = tracker(0.1);
        t.update(500.0);
        t.jump_to(42.0);
        assert_eq!(
            t.state(),
            ScrollState { current: 42.0, target: 42.0, velocity: 0.0 }
        );
    }
}
