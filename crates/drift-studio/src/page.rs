use drift_engine::coords::Bounds;
use drift_engine::host::{ElementHandle, LayoutSource};

/// Tag every tile answers to in [`LayoutSource::query_elements`].
pub const IMAGE_TAG: &str = "img";

const MARGIN: f64 = 64.0;
const GUTTER: f64 = 32.0;
const MIN_TILE_WIDTH: f64 = 48.0;

#[derive(Debug, Clone)]
struct Tile {
    source: String,
    /// width / height
    aspect: f64,
    bounds: Bounds,
}

/// A column grid of image tiles standing in for a scrolling document.
///
/// Tiles flow row-major; each row is as tall as its tallest tile. Bounds are
/// page coordinates and only change on [`reflow`](Page::reflow).
#[derive(Debug, Clone)]
pub struct Page {
    tiles: Vec<Tile>,
    columns: usize,
    width: f64,
    height: f64,
}

impl Page {
    /// `tiles` pairs each preload key with its image aspect ratio.
    pub fn new(tiles: impl IntoIterator<Item = (String, f64)>, columns: usize, width: f64) -> Self {
        let tiles = tiles
            .into_iter()
            .map(|(source, aspect)| Tile {
                source,
                aspect: if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 },
                bounds: Bounds::default(),
            })
            .collect();
        let mut page = Self {
            tiles,
            columns: columns.max(1),
            width: 0.0,
            height: 0.0,
        };
        page.reflow(width);
        page
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Document height including margins.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Largest meaningful scroll position for a viewport `viewport_height` tall.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.height - viewport_height).max(0.0)
    }

    /// Lays the tiles out for a viewport `width` logical pixels wide.
    pub fn reflow(&mut self, width: f64) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let cols = self.columns as f64;
        let tile_w = ((width - 2.0 * MARGIN - GUTTER * (cols - 1.0)) / cols).max(MIN_TILE_WIDTH);

        let mut top = MARGIN;
        for row in self.tiles.chunks_mut(self.columns) {
            let mut row_h: f64 = 0.0;
            for (col, tile) in row.iter_mut().enumerate() {
                let h = tile_w / tile.aspect;
                tile.bounds = Bounds::new(top, MARGIN + col as f64 * (tile_w + GUTTER), tile_w, h);
                row_h = row_h.max(h);
            }
            top += row_h + GUTTER;
        }

        self.width = width;
        self.height = if self.tiles.is_empty() { 0.0 } else { top - GUTTER + MARGIN };
        log::debug!(
            "page reflowed to {width:.0}px: {} tiles, {:.0}px tall",
            self.tiles.len(),
            self.height
        );
    }
}

impl LayoutSource for Page {
    fn query_elements(&self, selector: &str) -> Vec<ElementHandle> {
        if selector != IMAGE_TAG {
            return Vec::new();
        }
        (0..self.tiles.len() as u64).map(ElementHandle).collect()
    }

    fn bounding_box(&self, element: ElementHandle) -> Option<Bounds> {
        self.tiles.get(element.0 as usize).map(|t| t.bounds)
    }

    fn image_source(&self, element: ElementHandle) -> Option<String> {
        self.tiles.get(element.0 as usize).map(|t| t.source.clone())
    }
}
