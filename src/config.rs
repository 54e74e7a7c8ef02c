use serde::Deserialize;

/// Engine configuration. One instance per display, supplied by the host
/// application alongside the layer tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST backend, without a trailing slash.
    pub api_base: String,
    /// Pixel size of raster tiles requested from the backend.
    pub tile_size: u32,
    /// Tool state activated when no explicit tool is active.
    pub default_tool: Option<String>,
    /// Capacity of the in-memory tile cache, in encoded tiles.
    pub tile_cache_capacity: u64,
    /// Initial view center as `[lon, lat]` degrees.
    pub initial_center: Option<[f64; 2]>,
    /// Initial zoom level.
    pub initial_zoom: Option<u8>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base: "http://localhost:8080/api".to_string(),
            tile_size: 256,
            default_tool: Some("pan".to_string()),
            tile_cache_capacity: 512,
            initial_center: None,
            initial_zoom: None,
        }
    }
}
