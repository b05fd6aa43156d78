use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

use drift_engine::preload::{AssetTicket, PreloadBarrier};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Where one tile's pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetSource {
    File(PathBuf),
    /// Procedural gradient; `index` picks the palette.
    Generated { index: usize, width: u32, height: u32 },
}

impl AssetSource {
    /// Preload key, also used as the tile's image source.
    pub fn key(&self) -> String {
        match self {
            AssetSource::File(path) => path.display().to_string(),
            AssetSource::Generated { index, .. } => format!("generated-{index}"),
        }
    }

    /// Width / height, read from the file header for files.
    pub fn aspect(&self) -> f64 {
        match self {
            AssetSource::File(path) => match image::image_dimensions(path) {
                Ok((w, h)) if h > 0 => w as f64 / h as f64,
                Ok(_) => 1.0,
                Err(e) => {
                    log::warn!("cannot read dimensions of {}: {e}", path.display());
                    1.0
                }
            },
            AssetSource::Generated { width, height, .. } => *width as f64 / (*height).max(1) as f64,
        }
    }

    pub fn load(&self) -> Result<RgbaImage> {
        match self {
            AssetSource::File(path) => Ok(image::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?
                .into_rgba8()),
            AssetSource::Generated { index, width, height } => Ok(gradient_image(*index, *width, *height)),
        }
    }
}

/// Image files directly inside `dir`, sorted by path.
pub fn discover(dir: &Path) -> Result<Vec<AssetSource>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("cannot read {}", dir.display()))? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            paths.push(path);
        }
    }
    paths.sort();
    log::info!("found {} images in {}", paths.len(), dir.display());
    Ok(paths.into_iter().map(AssetSource::File).collect())
}

/// `count` procedural images with a mix of landscape and portrait shapes.
pub fn generated(count: usize) -> Vec<AssetSource> {
    const SHAPES: [(u32, u32); 3] = [(640, 480), (480, 640), (768, 432)];
    (0..count)
        .map(|index| {
            let (width, height) = SHAPES[index % SHAPES.len()];
            AssetSource::Generated { index, width, height }
        })
        .collect()
}

/// Issues one ticket per source on `barrier`, seals it, and decodes every
/// source on its own thread.
pub fn spawn_loaders(barrier: &mut PreloadBarrier, sources: &[AssetSource]) -> Vec<JoinHandle<()>> {
    let jobs: Vec<(AssetSource, AssetTicket)> = sources
        .iter()
        .map(|s| (s.clone(), barrier.ticket(s.key())))
        .collect();
    barrier.seal();

    jobs.into_iter()
        .filter_map(|(source, ticket)| {
            let name = format!("load-{}", ticket.name());
            let spawned = std::thread::Builder::new().name(name).spawn(move || match source.load() {
                Ok(img) => ticket.complete_image(img),
                Err(e) => ticket.fail(format!("{e:#}")),
            });
            // A failed spawn drops the ticket, which fails the barrier.
            spawned
                .map_err(|e| log::error!("failed to spawn loader thread: {e}"))
                .ok()
        })
        .collect()
}

const PALETTE: [([u8; 3], [u8; 3]); 6] = [
    ([236, 112, 99], [248, 196, 113]),
    ([93, 173, 226], [165, 105, 189]),
    ([72, 201, 176], [52, 73, 94]),
    ([245, 176, 65], [203, 67, 53]),
    ([174, 214, 241], [46, 134, 193]),
    ([130, 224, 170], [244, 208, 63]),
];

/// Diagonal two-color gradient with soft horizontal bands.
pub fn gradient_image(index: usize, width: u32, height: u32) -> RgbaImage {
    let (a, b) = PALETTE[index % PALETTE.len()];
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    RgbaImage::from_fn(width.max(1), height.max(1), |x, y| {
        let t = ((x as f32 / w) + (y as f32 / h)) * 0.5;
        let band = 0.92 + 0.08 * (y as f32 / h * 18.0 + index as f32).sin();
        let ch = |i: usize| ((a[i] as f32 * (1.0 - t) + b[i] as f32 * t) * band).clamp(0.0, 255.0) as u8;
        Rgba([ch(0), ch(1), ch(2), 255])
    })
}

#[cfg(test)]
mod tests {
    use std::task::Poll;
    use std::time::{Duration, Instant};

    use super::*;

    #[test]
    fn generated_sources_have_distinct_keys() {
        let sources = generated(4);
        assert_eq!(sources[0].key(), "generated-0");
        assert_eq!(sources[3].key(), "generated-3");
        assert!((sources[0].aspect() - 4.0 / 3.0).abs() < 1e-12);
        assert!((sources[1].aspect() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn gradient_is_opaque_and_sized() {
        let img = gradient_image(2, 32, 16);
        assert_eq!(img.dimensions(), (32, 16));
        assert!(img.pixels().all(|p| p.0[3] == 255));
        assert_ne!(img.get_pixel(0, 0), img.get_pixel(31, 15));
    }

    #[test]
    fn loaders_resolve_the_barrier() {
        let mut barrier = PreloadBarrier::new(Some(Duration::from_secs(10)));
        let sources = generated(3);
        for handle in spawn_loaders(&mut barrier, &sources) {
            handle.join().unwrap();
        }
        assert_eq!(barrier.poll(Instant::now()), Poll::Ready(Ok(())));
        assert!(barrier.assets().image("generated-1").is_some());
    }

    #[test]
    fn missing_file_fails_the_barrier() {
        let mut barrier = PreloadBarrier::new(None);
        let sources = [AssetSource::File(PathBuf::from("/nonexistent/drift/a.png"))];
        for handle in spawn_loaders(&mut barrier, &sources) {
            handle.join().unwrap();
        }
        assert!(matches!(barrier.poll(Instant::now()), Poll::Ready(Err(_))));
    }

    #[test]
    fn discover_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("drift-discover-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }
        let found = discover(&dir).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(
            found,
            vec![AssetSource::File(dir.join("a.JPG")), AssetSource::File(dir.join("b.png"))]
        );
    }
}
