use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Whether the runtime should keep the page window open.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// A page application hosted by [`Runtime`](crate::window::Runtime).
///
/// There is exactly one window; callbacks never need to say which.
pub trait App {
    /// Sees each raw window event before the runtime reacts to it
    /// (resize, close). Returning `Exit` closes the page.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Last call before [`Runtime::run`](crate::window::Runtime::run)
    /// returns; an error here becomes the error `run` returns.
    fn on_exit(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
