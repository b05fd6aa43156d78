use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};
use crate::time::FrameClock;

/// Page window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "drift".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

impl RuntimeConfig {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }
}

/// Requests an app may make from [`App::on_frame`](crate::core::App::on_frame).
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    exit: bool,
    closing: bool,
}

impl RuntimeCtx {
    /// Set on the one frame delivered after the user closed the window.
    /// Apps release their scene here instead of rendering.
    pub fn closing(&self) -> bool {
        self.closing
    }

    /// Closes the page window and leaves the event loop after this frame.
    pub fn exit(&mut self) {
        self.exit = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }
}

/// Entry point for the windowed runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the page window and drives `app` until the window closes or the
    /// app asks to exit. Window and GPU setup failures are returned here.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut driver = Driver {
            config,
            gpu_init,
            app,
            page: None,
            fatal: None,
        };

        event_loop
            .run_app(&mut driver)
            .context("winit event loop terminated with error")?;

        let exit = driver.app.on_exit();
        match driver.fatal {
            Some(e) => Err(e),
            None => exit,
        }
    }
}

/// The page window with its GPU context, input and clock.
#[self_referencing]
struct PageWindow {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl PageWindow {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        PageWindowTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for page window")
    }

    fn id(&self) -> WindowId {
        self.with_window(|w| w.id())
    }

    fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }
}

struct Driver<A> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    page: Option<PageWindow>,
    fatal: Option<anyhow::Error>,
}

impl<A: CoreApp> Driver<A> {
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        // Drops the surface before the window.
        self.page = None;
        event_loop.exit();
    }

    /// Runs one app frame; returns `true` if the app wants to exit.
    fn frame(&mut self, id: WindowId, closing: bool) -> bool {
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        let app = &mut self.app;
        let mut runtime = RuntimeCtx { exit: false, closing };

        let control = page.with_mut(|fields| {
            let time = fields.clock.tick();
            let mut ctx = FrameCtx {
                window: WindowCtx { id, window: fields.window },
                gpu: fields.gpu,
                input: fields.input_state,
                input_frame: fields.input_frame,
                time,
                runtime: &mut runtime,
            };
            let control = app.on_frame(&mut ctx);
            fields.input_frame.clear();
            control
        });

        control == AppControl::Exit || runtime.exit_requested()
    }
}

impl<A: CoreApp> ApplicationHandler for Driver<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.page.is_some() {
            return;
        }
        match PageWindow::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(page) => {
                log::info!("page window {:?} ready", page.id());
                page.request_redraw();
                self.page = Some(page);
            }
            Err(e) => {
                log::error!("failed to open page window: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Continuous redraw; FIFO presentation paces it to the display.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(page) = &self.page {
            page.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(page) = self.page.as_mut() else {
            return;
        };
        if page.id() != window_id {
            return;
        }

        let app = &mut self.app;
        let control = page.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.window, &event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
            app.on_window_event(&event)
        });
        if control == AppControl::Exit {
            self.shut_down(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.frame(window_id, true);
                self.shut_down(event_loop);
            }

            WindowEvent::Resized(size) => {
                page.with_gpu_mut(|gpu| gpu.resize(size));
                page.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = page.with_window(|w| w.inner_size());
                page.with_gpu_mut(|gpu| gpu.resize(size));
                page.request_redraw();
            }

            // Don't feed the hidden interval to the loop as one huge dt.
            WindowEvent::Occluded(false) => page.with_clock_mut(|c| c.reset()),

            WindowEvent::RedrawRequested => {
                if self.frame(window_id, false) {
                    self.shut_down(event_loop);
                }
            }

            _ => {}
        }
    }
}
