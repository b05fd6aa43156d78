use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::task::Poll;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::error::PreloadFailure;

/// Payload delivered when a ticket completes.
pub enum LoadedAsset {
    /// A decoded image, keyed by the ticket name in the [`AssetStore`].
    Image(RgbaImage),
    /// Readiness-only dependency (fonts, initial layout).
    Ready,
}

enum Signal {
    Completed { name: String, asset: LoadedAsset },
    Failed { name: String, reason: String },
}

/// Completion handle for one outstanding asset. `Send`, so it can move to a loader thread.
///
/// Dropping a ticket without completing it fails the barrier.
pub struct AssetTicket {
    name: String,
    tx: Sender<Signal>,
    done: bool,
}

impl AssetTicket {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn complete(self, asset: LoadedAsset) {
        self.finish(|name| Signal::Completed { name, asset });
    }

    pub fn complete_image(self, image: RgbaImage) {
        self.complete(LoadedAsset::Image(image));
    }

    pub fn fail(self, reason: impl Into<String>) {
        let reason = reason.into();
        self.finish(|name| Signal::Failed { name, reason });
    }

    fn finish(mut self, make: impl FnOnce(String) -> Signal) {
        self.done = true;
        let name = std::mem::take(&mut self.name);
        // The barrier may already be gone (loop torn down); nothing to report to.
        let _ = self.tx.send(make(name));
    }
}

impl Drop for AssetTicket {
    fn drop(&mut self) {
        if !self.done {
            let _ = self.tx.send(Signal::Failed {
                name: std::mem::take(&mut self.name),
                reason: "ticket dropped before completion".to_string(),
            });
        }
    }
}

/// Decoded images, keyed by ticket name.
#[derive(Default)]
pub struct AssetStore {
    images: HashMap<String, RgbaImage>,
}

impl AssetStore {
    pub fn image(&self, key: &str) -> Option<&RgbaImage> {
        self.images.get(key)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Barrier that resolves once it is sealed and every ticket has completed.
///
/// Failure of any ticket, expiry of the optional timeout, or an explicit
/// [`cancel`](PreloadBarrier::cancel) resolve it with an error instead. The
/// outcome is sticky.
pub struct PreloadBarrier {
    tx: Sender<Signal>,
    rx: Receiver<Signal>,
    outstanding: HashMap<String, usize>,
    sealed: bool,
    started: Instant,
    timeout: Option<Duration>,
    outcome: Option<Result<(), PreloadFailure>>,
    store: AssetStore,
}

impl PreloadBarrier {
    /// `timeout` is measured from construction; `None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            outstanding: HashMap::new(),
            sealed: false,
            started: Instant::now(),
            timeout,
            outcome: None,
            store: AssetStore::default(),
        }
    }

    /// A barrier with nothing to wait for.
    pub fn ready() -> Self {
        let mut b = Self::new(None);
        b.seal();
        b.outcome = Some(Ok(()));
        b
    }

    /// Registers one more asset to wait for.
    pub fn ticket(&mut self, name: impl Into<String>) -> AssetTicket {
        let name = name.into();
        if self.sealed {
            log::warn!("preload ticket {name:?} issued after the barrier was sealed");
        }
        *self.outstanding.entry(name.clone()).or_insert(0) += 1;
        AssetTicket {
            name,
            tx: self.tx.clone(),
            done: false,
        }
    }

    /// Declares that no further tickets will be issued.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn cancel(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(Err(PreloadFailure::Cancelled));
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.outcome, Some(Ok(())))
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.values().sum()
    }

    pub fn assets(&self) -> &AssetStore {
        &self.store
    }

    /// Collects completions and reports the barrier state as of `now`.
    pub fn poll(&mut self, now: Instant) -> Poll<Result<(), PreloadFailure>> {
        if let Some(outcome) = &self.outcome {
            return Poll::Ready(outcome.clone());
        }

        while let Ok(signal) = self.rx.try_recv() {
            match signal {
                Signal::Completed { name, asset } => {
                    self.settle(&name);
                    if let LoadedAsset::Image(img) = asset {
                        log::debug!("preloaded image {name:?} ({}x{})", img.width(), img.height());
                        self.store.images.insert(name, img);
                    }
                }
                Signal::Failed { name, reason } => {
                    self.settle(&name);
                    log::warn!("preload of {name:?} failed: {reason}");
                    self.outcome = Some(Err(PreloadFailure::Asset { name, reason }));
                    break;
                }
            }
        }

        if self.outcome.is_none() {
            if self.sealed && self.outstanding.is_empty() {
                log::info!("preload complete ({} images)", self.store.len());
                self.outcome = Some(Ok(()));
            } else if let Some(limit) = self.timeout {
                if now.saturating_duration_since(self.started) >= limit {
                    log::warn!("preload timed out with {} assets outstanding", self.outstanding());
                    self.outcome = Some(Err(PreloadFailure::TimedOut(limit)));
                }
            }
        }

        match &self.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => Poll::Pending,
        }
    }

    fn settle(&mut self, name: &str) {
        if let Some(n) = self.outstanding.get_mut(name) {
            *n -= 1;
            if *n == 0 {
                self.outstanding.remove(name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsealed_barrier_stays_pending() {
        let mut b = PreloadBarrier::new(None);
        assert!(b.poll(Instant::now()).is_pending());
    }

    #[test]
    fn resolves_after_seal_and_all_tickets() {
        let mut b = PreloadBarrier::new(None);
        let a = b.ticket("a.png");
        let f = b.ticket("font");
        b.seal();

        a.complete_image(RgbaImage::new(2, 3));
        assert!(b.poll(Instant::now()).is_pending());

        f.complete(LoadedAsset::Ready);
        assert_eq!(b.poll(Instant::now()), Poll::Ready(Ok(())));
        assert!(b.is_ready());
        assert_eq!(b.assets().image("a.png").map(|i| i.dimensions()), Some((2, 3)));
        assert!(b.assets().image("font").is_none());
    }

    #[test]
    fn tickets_complete_from_other_threads() {
        let mut b = PreloadBarrier::new(None);
        let t = b.ticket("remote");
        b.seal();
        std::thread::spawn(move || t.complete_image(RgbaImage::new(1, 1)))
            .join()
            .unwrap();
        assert_eq!(b.poll(Instant::now()), Poll::Ready(Ok(())));
    }

    #[test]
    fn failed_ticket_fails_barrier() {
        let mut b = PreloadBarrier::new(None);
        let t = b.ticket("broken.jpg");
        b.seal();
        t.fail("decode error");
        assert_eq!(
            b.poll(Instant::now()),
            Poll::Ready(Err(PreloadFailure::Asset {
                name: "broken.jpg".into(),
                reason: "decode error".into(),
            }))
        );
        assert!(!b.is_ready());
    }

    #[test]
    fn dropped_ticket_fails_barrier() {
        let mut b = PreloadBarrier::new(None);
        drop(b.ticket("lost"));
        b.seal();
        assert!(matches!(
            b.poll(Instant::now()),
            Poll::Ready(Err(PreloadFailure::Asset { .. }))
        ));
    }

    #[test]
    fn times_out() {
        let mut b = PreloadBarrier::new(Some(Duration::from_secs(5)));
        let _pending = b.ticket("slow");
        b.seal();
        assert!(b.poll(Instant::now()).is_pending());
        let later = Instant::now() + Duration::from_secs(60);
        assert_eq!(
            b.poll(later),
            Poll::Ready(Err(PreloadFailure::TimedOut(Duration::from_secs(5))))
        );
    }

    #[test]
    fn cancel_is_sticky() {
        let mut b = PreloadBarrier::new(None);
        b.seal();
        b.cancel();
        assert_eq!(b.poll(Instant::now()), Poll::Ready(Err(PreloadFailure::Cancelled)));
    }

    #[test]
    fn ready_barrier_is_ready() {
        assert!(PreloadBarrier::ready().is_ready());
    }
}
