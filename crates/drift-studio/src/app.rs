use anyhow::Context;

use drift_engine::core::{App, AppControl, FrameCtx};
use drift_engine::error::SyncError;
use drift_engine::frame_loop::{FrameLoop, TickOutcome};
use drift_engine::host::HostEvent;
use drift_engine::input::{Key, ScrollStep};
use drift_engine::render::gpu::GpuStage;
use drift_engine::render::Renderer;
use drift_engine::time::FrameTime;

use crate::page::Page;

/// Windowed host: the page's frame loop plus the GPU stage it draws with.
pub struct StudioApp {
    host: PageHost,
    stage: GpuStage,
}

impl StudioApp {
    pub fn new(frame_loop: FrameLoop<Page>) -> Self {
        Self {
            host: PageHost::new(frame_loop),
            stage: GpuStage::new(),
        }
    }
}

impl App for StudioApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let time = ctx.time;
        let closing = ctx.runtime.closing() || ctx.input_frame.pressed(Key::Escape);
        if !closing {
            self.host.forward_input(ctx);
        }
        let mut renderer = ctx.renderer(&mut self.stage);
        self.host.frame(&mut renderer, time, closing)
    }

    fn on_exit(&mut self) -> anyhow::Result<()> {
        log::info!(
            "exiting with {} meshes bound, {} textures resident",
            self.host.frame_loop.sync().len(),
            self.stage.texture_count()
        );
        self.host.finish()
    }
}

/// Turns window input into host events and ticks the loop once per redraw.
///
/// Renderer-agnostic; the windowed app lends it a `GpuRenderer` each frame.
pub struct PageHost {
    frame_loop: FrameLoop<Page>,
    step: ScrollStep,

    scroll: f64,
    viewport: (f64, f64),
    pointer: Option<(f64, f64)>,
    hidden: bool,

    /// First error that ended the loop; reported from `finish`.
    failure: Option<SyncError>,
}

impl PageHost {
    pub fn new(frame_loop: FrameLoop<Page>) -> Self {
        Self {
            frame_loop,
            step: ScrollStep::default(),
            scroll: 0.0,
            viewport: (0.0, 0.0),
            pointer: None,
            hidden: false,
            failure: None,
        }
    }

    fn forward_input(&mut self, ctx: &FrameCtx<'_, '_>) {
        let (w, h) = ctx.window.logical_size();
        if (w, h) != self.viewport && w > 0.0 && h > 0.0 {
            self.viewport = (w, h);
            self.frame_loop.layout_mut().reflow(w);
            self.frame_loop.push_event(HostEvent::Resize { width: w, height: h });
        }

        let max = self.frame_loop.layout().max_scroll(self.viewport.1);
        let mut scroll = self.scroll + ctx.input_frame.scroll_delta(self.step);
        if ctx.input_frame.pressed(Key::Home) {
            scroll = 0.0;
        }
        if ctx.input_frame.pressed(Key::End) {
            scroll = max;
        }
        let scroll = scroll.clamp(0.0, max);
        if scroll != self.scroll {
            self.scroll = scroll;
            self.frame_loop.push_event(HostEvent::Scroll { position: scroll });
        }

        let pointer = ctx.input.pointer_pos;
        if pointer != self.pointer {
            self.pointer = pointer;
            self.frame_loop.push_event(match pointer {
                Some((x, y)) => HostEvent::PointerMoved { x, y },
                None => HostEvent::PointerLeft,
            });
        }

        if ctx.input.occluded != self.hidden {
            self.hidden = ctx.input.occluded;
            self.frame_loop.push_event(HostEvent::Visibility { hidden: self.hidden });
        }
    }

    /// One redraw. With `closing` set the scene is torn down instead.
    fn frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R, time: FrameTime, closing: bool) -> AppControl {
        if closing {
            self.frame_loop.stop(renderer);
            return AppControl::Exit;
        }

        match self.frame_loop.tick(renderer, time) {
            Ok(TickOutcome::Stopped) => AppControl::Exit,
            Ok(_) => AppControl::Continue,
            Err(SyncError::Render(e)) => {
                log::warn!("frame dropped: {e:#}");
                AppControl::Continue
            }
            Err(e) => {
                log::error!("{e}");
                self.frame_loop.stop(renderer);
                self.failure.get_or_insert(e);
                AppControl::Exit
            }
        }
    }

    /// Surfaces the error that stopped the page, if any.
    fn finish(&mut self) -> anyhow::Result<()> {
        match self.failure.take() {
            Some(e) => Err(e).context("page stopped"),
            None => Ok(()),
        }
    }
}
