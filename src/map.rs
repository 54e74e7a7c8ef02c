use crate::geometry::projection::{MERCATOR_BOUND, mercator_to_lon_lat, resolution_for_zoom};
use crate::models::geometry::GeometryExtent;

pub const MAX_ZOOM: u8 = 22;

/// Minimal map-view model: center, zoom and viewport size in Web Mercator.
///
/// Stands in for the rendering widget's view state; the engine only needs
/// enough of it to decide which tiles are wanted and where zoom-to-extent
/// lands.
#[derive(Debug, Clone)]
pub struct MapView {
    center: (f64, f64),
    zoom: u8,
    width: u32,
    height: u32,
    tile_size: u32,
}

impl MapView {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        MapView {
            center: (0.0, 0.0),
            zoom: 0,
            width,
            height,
            tile_size,
        }
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.min(MAX_ZOOM);
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn set_center(&mut self, x: f64, y: f64) {
        self.center = (
            x.clamp(-MERCATOR_BOUND, MERCATOR_BOUND),
            y.clamp(-MERCATOR_BOUND, MERCATOR_BOUND),
        );
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Center as `(lon, lat)` degrees, for UIs that talk geographic.
    pub fn center_lon_lat(&self) -> (f64, f64) {
        mercator_to_lon_lat(self.center.0, self.center.1)
    }

    /// Meters per pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        resolution_for_zoom(self.zoom, self.tile_size)
    }

    /// Extent currently covered by the viewport.
    pub fn view_extent(&self) -> GeometryExtent {
        let res = self.resolution();
        let half_w = self.width as f64 / 2.0 * res;
        let half_h = self.height as f64 / 2.0 * res;
        GeometryExtent {
            minx: self.center.0 - half_w,
            miny: self.center.1 - half_h,
            maxx: self.center.0 + half_w,
            maxy: self.center.1 + half_h,
        }
    }

    /// Center on an extent at the highest zoom that still shows all of it.
    pub fn fit_extent(&mut self, extent: &GeometryExtent) {
        self.center = extent.center();
        let needed = (extent.width() / self.width as f64)
            .max(extent.height() / self.height as f64);
        let mut zoom = 0;
        while zoom < MAX_ZOOM && resolution_for_zoom(zoom + 1, self.tile_size) >= needed {
            zoom += 1;
        }
        self.zoom = zoom;
    }

    /// Slippy tile coordinates intersecting the viewport, clamped to the
    /// world grid.
    pub fn visible_tiles(&self) -> Vec<(u8, u32, u32)> {
        let n = 1u32 << self.zoom;
        let extent = self.view_extent();

        let tile_col = |x: f64| -> u32 {
            let t = (x + MERCATOR_BOUND) / (2.0 * MERCATOR_BOUND) * n as f64;
            (t.floor() as i64).clamp(0, n as i64 - 1) as u32
        };
        let tile_row = |y: f64| -> u32 {
            let t = (MERCATOR_BOUND - y) / (2.0 * MERCATOR_BOUND) * n as f64;
            (t.floor() as i64).clamp(0, n as i64 - 1) as u32
        };

        let (x0, x1) = (tile_col(extent.minx), tile_col(extent.maxx));
        let (y0, y1) = (tile_row(extent.maxy), tile_row(extent.miny));

        let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (y1 - y0 + 1)) as usize);
        for y in y0..=y1 {
            for x in x0..=x1 {
                tiles.push((self.zoom, x, y));
            }
        }
        tiles
    }
}
