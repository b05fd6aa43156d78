use std::time::Duration;

use crate::distortion::DistortionConfig;
use crate::scroll::ScrollConfig;
use crate::sync::HoverConfig;

/// Everything a [`FrameLoop`](super::FrameLoop) needs besides its capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Layout query naming the image elements to bind.
    pub selector: String,
    pub scroll: ScrollConfig,
    pub distortion: DistortionConfig,
    pub hover: HoverConfig,
    /// Scene time advanced per second of wall time (feeds `time` uniforms).
    pub time_scale: f64,
    /// Applied to barriers created by [`LoopConfig::preload_barrier`].
    pub preload_timeout: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            selector: "img".to_string(),
            scroll: ScrollConfig::default(),
            distortion: DistortionConfig::default(),
            hover: HoverConfig::default(),
            time_scale: 6.0,
            preload_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl LoopConfig {
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn scroll(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn distortion(mut self, distortion: DistortionConfig) -> Self {
        self.distortion = distortion;
        self
    }

    pub fn hover(mut self, hover: HoverConfig) -> Self {
        self.hover = hover;
        self
    }

    pub fn time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn preload_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.preload_timeout = timeout;
        self
    }

    /// A fresh barrier using this config's timeout.
    pub fn preload_barrier(&self) -> crate::preload::PreloadBarrier {
        crate::preload::PreloadBarrier::new(self.preload_timeout)
    }
}
