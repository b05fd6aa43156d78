use std::task::Poll;

use crate::coords::{Vec2, ViewportFrame};
use crate::distortion::DistortionUniforms;
use crate::error::{SyncError, SyncResult};
use crate::host::{EventQueue, HostEvent, LayoutSource};
use crate::preload::PreloadBarrier;
use crate::render::Renderer;
use crate::scroll::{ScrollState, ScrollTracker};
use crate::sync::{Reposition, SceneSync};
use crate::time::FrameTime;

use super::config::LoopConfig;

/// Lifecycle of a [`FrameLoop`].
///
/// ```text
/// Idle ──ready──▶ Running ◀──visible── Suspended
///   │                │ ──hidden──────────▶ │
///   └──fail/timeout──┴──────stop()─────────┴──▶ Stopped
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Waiting for the preload barrier.
    Idle,
    Running,
    /// Host reported the page hidden; nothing is rendered.
    Suspended,
    Stopped,
}

/// What one tick did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TickOutcome {
    /// Preload still pending.
    Waiting,
    Rendered(TickReport),
    Suspended,
    Stopped,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TickReport {
    pub scroll: ScrollState,
    pub reposition: Reposition,
    pub distortion: DistortionUniforms,
}

/// Scroll-synchronized image scene driver.
pub struct FrameLoop<L> {
    config: LoopConfig,
    layout: L,
    state: LoopState,
    preload: PreloadBarrier,
    tracker: ScrollTracker,
    sync: SceneSync,
    events: EventQueue,
    rejected: Vec<SyncError>,

    raw_scroll: f64,
    viewport: (f64, f64),
    pointer: Option<Vec2>,
    hidden: bool,
    /// Scene time fed to the `time` uniforms.
    time: f64,
}

impl<L: LayoutSource> FrameLoop<L> {
    /// `viewport` is the initial logical size; later changes arrive as
    /// [`HostEvent::Resize`].
    pub fn new(config: LoopConfig, layout: L, preload: PreloadBarrier, viewport: (f64, f64)) -> Self {
        Self {
            tracker: ScrollTracker::new(config.scroll),
            sync: SceneSync::new(config.hover),
            config,
            layout,
            state: LoopState::Idle,
            preload,
            events: EventQueue::new(),
            rejected: Vec::new(),
            raw_scroll: 0.0,
            viewport,
            pointer: None,
            hidden: false,
            time: 0.0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Host input enters here; it is applied at the start of the next tick.
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push(event);
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Mutable layout access for hosts that reflow it; follow up with a
    /// [`HostEvent::Resize`] so bindings pick up the new geometry.
    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn preload_mut(&mut self) -> &mut PreloadBarrier {
        &mut self.preload
    }

    pub fn sync(&self) -> &SceneSync {
        &self.sync
    }

    pub fn scroll(&self) -> ScrollState {
        self.tracker.state()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Per-element bind failures from the transition out of `Idle`.
    pub fn rejected(&self) -> &[SyncError] {
        &self.rejected
    }

    /// Runs one tick.
    ///
    /// Errors: preload failure (the loop stops) and renderer failures (the
    /// loop keeps running; the next tick retries).
    pub fn tick<R: Renderer + ?Sized>(&mut self, renderer: &mut R, time: FrameTime) -> SyncResult<TickOutcome> {
        if self.state == LoopState::Stopped {
            self.events.drain();
            return Ok(TickOutcome::Stopped);
        }

        self.apply_events(renderer);

        if self.state == LoopState::Idle {
            match self.preload.poll(time.now) {
                Poll::Pending => return Ok(TickOutcome::Waiting),
                Poll::Ready(Err(failure)) => {
                    log::error!("preload failed, stopping: {failure}");
                    self.state = LoopState::Stopped;
                    return Err(failure.into());
                }
                Poll::Ready(Ok(())) => self.start(renderer)?,
            }
        }

        match (self.state, self.hidden) {
            (LoopState::Running, true) => {
                log::info!("page hidden; suspending");
                self.state = LoopState::Suspended;
            }
            (LoopState::Suspended, false) => {
                log::info!("page visible; resuming");
                // Scrolling done while hidden is not motion the user saw.
                self.tracker.jump_to(self.raw_scroll);
                self.state = LoopState::Running;
            }
            _ => {}
        }

        if self.state == LoopState::Suspended {
            return Ok(TickOutcome::Suspended);
        }
        self.render(renderer, time.dt).map(TickOutcome::Rendered)
    }

    /// Tears the scene down: destroys every mesh and stops the loop.
    pub fn stop<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.state == LoopState::Stopped {
            return;
        }
        self.preload.cancel();
        self.sync.unbind_all(renderer);
        self.state = LoopState::Stopped;
        log::info!("frame loop stopped");
    }

    fn apply_events<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        for event in self.events.drain() {
            match event {
                HostEvent::Scroll { position } => {
                    if position.is_finite() {
                        self.raw_scroll = position;
                    }
                }
                HostEvent::Resize { width, height } => {
                    self.viewport = (width, height);
                    renderer.set_viewport(width, height);
                    self.sync.refresh_bounds(&self.layout);
                }
                HostEvent::PointerMoved { x, y } => self.pointer = Some((x, y).into()),
                HostEvent::PointerLeft => self.pointer = None,
                HostEvent::Visibility { hidden } => self.hidden = hidden,
            }
        }
    }

    fn start<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> SyncResult<()> {
        let elements = self.layout.query_elements(&self.config.selector);
        renderer.set_viewport(self.viewport.0, self.viewport.1);

        let results = self.sync.bind(renderer, &self.layout, &self.preload, &elements)?;
        self.rejected = results.into_iter().filter_map(Result::err).collect();

        // Start settled at the page's scroll position rather than sweeping in from 0.
        self.tracker.jump_to(self.raw_scroll);
        self.state = LoopState::Running;
        log::info!(
            "frame loop running with {} bound elements ({} rejected)",
            self.sync.len(),
            self.rejected.len()
        );
        Ok(())
    }

    fn render<R: Renderer + ?Sized>(&mut self, renderer: &mut R, dt: f64) -> SyncResult<TickReport> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.time += dt * self.config.time_scale;

        let scroll = self.tracker.update(self.raw_scroll);
        let frame = ViewportFrame::new(self.viewport.0, self.viewport.1, scroll.current);

        let reposition = self.sync.reposition(renderer, frame);
        self.sync.update_pointer(self.pointer, frame);
        self.sync.advance_materials(renderer, dt, self.time);

        let distortion = DistortionUniforms::from_velocity(self.time, scroll.velocity, &self.config.distortion);
        let scene = renderer.render_scene()?;
        let output = renderer.post_process(scene, &distortion)?;
        renderer.present(output)?;

        log::trace!(
            "tick: scroll {:.2} (v {:.2}), speed {:.3}",
            scroll.current,
            scroll.velocity,
            distortion.scroll_speed
        );
        Ok(TickReport { scroll, reposition, distortion })
    }
}
