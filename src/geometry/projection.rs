use std::f64::consts::PI;

/// WebMercator constants
const R_MAJOR: f64 = 6378137.0;
const MAX_LAT: f64 = 85.05112877980659; // Max bounds for Web Mercator

/// Half the circumference of the Web Mercator world, in meters.
pub const MERCATOR_BOUND: f64 = 20037508.342789244;

/// from longitude, latitude (degrees) → Web Mercator (x, y in meters)
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    // clamp latitude into Mercator’s valid range
    let clamped_lat = lat.clamp(-MAX_LAT, MAX_LAT);

    let x = lon * R_MAJOR * PI / 180.0;
    let lat_rad = clamped_lat * PI / 180.0;
    let y = R_MAJOR * ((PI / 4.0 + lat_rad / 2.0).tan().ln());
    (x, y)
}

/// from Web Mercator (x, y in meters) → longitude, latitude (degrees)
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = x / (R_MAJOR * PI / 180.0);
    let lat_rad = 2.0 * ((y / R_MAJOR).exp().atan()) - PI / 2.0;
    let lat = lat_rad * 180.0 / PI;
    (lon, lat)
}

/// Web Mercator bounding box of a slippy-map tile.
///
/// https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
pub fn tile_bounds(z: u8, x: u32, y: u32, tile_size: u32) -> (f64, f64, f64, f64) {
    let tile_size = tile_size as f64;
    let initial_resolution = 2.0 * MERCATOR_BOUND / tile_size;
    let res = initial_resolution / (2f64.powi(z as i32));
    let minx = x as f64 * tile_size * res - MERCATOR_BOUND;
    let maxx = (x as f64 + 1.0) * tile_size * res - MERCATOR_BOUND;
    let maxy = MERCATOR_BOUND - y as f64 * tile_size * res;
    let miny = MERCATOR_BOUND - (y as f64 + 1.0) * tile_size * res;
    (minx, miny, maxx, maxy)
}

/// Map resolution (meters per pixel) at a given zoom level.
pub fn resolution_for_zoom(z: u8, tile_size: u32) -> f64 {
    2.0 * MERCATOR_BOUND / tile_size as f64 / (2f64.powi(z as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;
    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_lon_lat_to_mercator_known_points() {
        let (x, y) = lon_lat_to_mercator(0.0, 0.0);
        assert!(approx_eq(x, 0.0));
        assert!(approx_eq(y, 0.0));

        let (x, y) = lon_lat_to_mercator(180.0, 0.0);
        assert!(approx_eq(x, MERCATOR_BOUND));
        assert!(approx_eq(y, 0.0));

        // Zürich, cross-checked against EPSG:4326 → EPSG:3857
        let (x, y) = lon_lat_to_mercator(8.5417, 47.3769);
        assert!((x - 950857.560).abs() < 1e-2, "x was {}", x);
        assert!((y - 5995428.916).abs() < 1e-2, "y was {}", y);
    }

    #[test]
    fn test_lon_lat_to_mercator_clamps_lat_above_max() {
        let (x1, y1) = lon_lat_to_mercator(10.0, 90.0);
        let (x2, y2) = lon_lat_to_mercator(10.0, MAX_LAT);
        assert!(approx_eq(x1, x2));
        assert!(approx_eq(y1, y2));
    }

    #[test]
    fn test_mercator_round_trip() {
        for &(lon, lat) in &[(-122.4194, 37.7749), (151.2093, -33.8688), (0.0, 51.5)] {
            let (x, y) = lon_lat_to_mercator(lon, lat);
            let (lon2, lat2) = mercator_to_lon_lat(x, y);
            assert!(approx_eq(lon, lon2), "lon mismatch: {} vs {}", lon, lon2);
            assert!(approx_eq(lat, lat2), "lat mismatch: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tile_bounds_zoom_zero_covers_world() {
        let (minx, miny, maxx, maxy) = tile_bounds(0, 0, 0, 256);
        assert!(approx_eq(minx, -MERCATOR_BOUND));
        assert!(approx_eq(miny, -MERCATOR_BOUND));
        assert!(approx_eq(maxx, MERCATOR_BOUND));
        assert!(approx_eq(maxy, MERCATOR_BOUND));
    }

    #[test]
    fn test_tile_bounds_quadrants_at_zoom_one() {
        // (0,0) at z=1 is the north-west quadrant
        let (minx, miny, maxx, maxy) = tile_bounds(1, 0, 0, 256);
        assert!(approx_eq(minx, -MERCATOR_BOUND));
        assert!(approx_eq(maxx, 0.0));
        assert!(approx_eq(miny, 0.0));
        assert!(approx_eq(maxy, MERCATOR_BOUND));
    }

    #[test]
    fn test_resolution_halves_per_zoom() {
        let r0 = resolution_for_zoom(0, 256);
        let r1 = resolution_for_zoom(1, 256);
        assert!(approx_eq(r0 / 2.0, r1));
    }
}
