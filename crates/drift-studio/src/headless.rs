use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use drift_engine::frame_loop::{FrameLoop, TickOutcome};
use drift_engine::host::HostEvent;
use drift_engine::render::SoftwareRenderer;
use drift_engine::time::FrameClock;

use crate::page::Page;

const FRAME: Duration = Duration::from_micros(16_667);
const PRELOAD_POLL: Duration = Duration::from_millis(5);

/// Offscreen run parameters.
#[derive(Debug, Clone)]
pub struct HeadlessRun {
    pub viewport: (f64, f64),
    pub frames: u64,
    /// Scroll position added per simulated frame, clamped to the page.
    pub scroll_per_frame: f64,
}

/// Renders `run.frames` frames on the CPU with a scripted scroll and pointer,
/// then writes the last frame to `output`.
pub fn run(mut frame_loop: FrameLoop<Page>, run: &HeadlessRun, output: &Path) -> Result<()> {
    let (w, h) = run.viewport;
    let mut renderer = SoftwareRenderer::new(w, h);
    let mut clock = FrameClock::new();

    // Preload resolves on real time; loaders are real threads.
    loop {
        match frame_loop.tick(&mut renderer, clock.tick())? {
            TickOutcome::Waiting => thread::sleep(PRELOAD_POLL),
            _ => break,
        }
    }
    log::info!("preload done; simulating {} frames", run.frames);

    let max = frame_loop.layout().max_scroll(h);
    frame_loop.push_event(HostEvent::PointerMoved { x: w * 0.3, y: h * 0.4 });

    let mut now = Instant::now();
    let mut last = None;
    for i in 0..run.frames {
        now += FRAME;
        let position = (i as f64 * run.scroll_per_frame).clamp(0.0, max);
        frame_loop.push_event(HostEvent::Scroll { position });

        match frame_loop.tick(&mut renderer, clock.tick_at(now))? {
            TickOutcome::Rendered(report) => last = Some(report),
            TickOutcome::Stopped => break,
            other => log::debug!("frame {i}: {other:?}"),
        }
    }

    if let Some(report) = last {
        log::info!(
            "final scroll {:.1} (velocity {:.1}), distortion speed {:.3}",
            report.scroll.current,
            report.scroll.velocity,
            report.distortion.scroll_speed
        );
    }

    let frame = renderer.last_frame().context("no frame was presented")?;
    frame
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {} ({} frames presented)", output.display(), renderer.frames_presented());

    frame_loop.stop(&mut renderer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use drift_engine::frame_loop::LoopConfig;
    use drift_engine::preload::PreloadBarrier;

    use super::*;
    use crate::assets::{generated, spawn_loaders};

    #[test]
    fn headless_run_writes_png() {
        let sources = generated(4);
        let page = Page::new(sources.iter().map(|s| (s.key(), s.aspect())), 2, 320.0);
        let mut barrier = PreloadBarrier::new(Some(Duration::from_secs(10)));
        let _loaders = spawn_loaders(&mut barrier, &sources);
        let frame_loop = FrameLoop::new(LoopConfig::default(), page, barrier, (320.0, 240.0));

        let out = std::env::temp_dir().join(format!("drift-headless-{}.png", std::process::id()));
        let params = HeadlessRun {
            viewport: (320.0, 240.0),
            frames: 6,
            scroll_per_frame: 20.0,
        };
        run(frame_loop, &params, &out).unwrap();

        let img = image::open(&out).unwrap();
        std::fs::remove_file(&out).unwrap();
        assert_eq!((img.width(), img.height()), (320, 240));
    }
}
