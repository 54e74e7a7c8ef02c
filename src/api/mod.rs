pub mod feature;
pub mod render;

pub use feature::HttpFeatureStore;
pub use render::{HttpTileFetch, image_url, tile_url_template};
