pub mod projection;

pub use projection::{lon_lat_to_mercator, mercator_to_lon_lat, resolution_for_zoom, tile_bounds};
