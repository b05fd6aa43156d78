/// Easing curve applied to normalized progress `t ∈ [0,1]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Ease {
    Linear,
    /// `1 - (1 - t)²`
    #[default]
    QuadOut,
    /// Cubic ease in/out.
    CubicInOut,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A scalar easing from the current value toward a target over a fixed duration.
///
/// Retargeting mid-flight starts a new segment from the current value, so
/// rapid enter/leave sequences never jump.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    value: f64,
    elapsed: f64,
    duration: f64,
    ease: Ease,
}

impl Tween {
    pub fn new(value: f64, duration: f64, ease: Ease) -> Self {
        Self {
            from: value,
            to: value,
            value,
            elapsed: 0.0,
            duration: duration.max(0.0),
            ease,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.value == self.to
    }

    /// Starts easing toward `to`. No-op if already heading there.
    pub fn retarget(&mut self, to: f64) {
        if to == self.to {
            return;
        }
        self.from = self.value;
        self.to = to;
        self.elapsed = 0.0;
    }

    /// Advances by `dt` seconds and returns the new value.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if self.is_settled() {
            return self.value;
        }
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.value = self.to;
        } else {
            let k = self.ease.apply(self.elapsed / self.duration);
            self.value = self.from + (self.to - self.from) * k;
        }
        self.value
    }
}
