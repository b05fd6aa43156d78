//! Asset preload gating.
//!
//! Bounding boxes are meaningless before images and fonts are in place, so the
//! loop stays idle until a [`PreloadBarrier`] resolves. Loaders run wherever
//! they like (worker threads, async tasks) and report through [`AssetTicket`]s;
//! the barrier only observes results when the loop polls it.

mod barrier;

pub use barrier::{AssetStore, AssetTicket, LoadedAsset, PreloadBarrier};
