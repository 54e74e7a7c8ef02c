use crate::api::render::image_url;
use crate::models::geometry::GeometryExtent;
use crate::traits::TileFetch;
use crate::utils::query::set_url_param;
use crate::utils::status::Stats;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// WMS-style single-image source: one render request per view extent.
///
/// Image requests are not tracked or aborted: unlike tiles they are few and
/// cheap to let finish, so the in-flight machinery stays on the tiled path.
pub struct ImageSource {
    style_id: i64,
    api_base: String,
    symbols: Option<Vec<String>>,
    fetcher: Arc<dyn TileFetch>,
    counter: AtomicU64,
    placeholder: Arc<Vec<u8>>,
    stats: Stats,
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSource")
            .field("style_id", &self.style_id)
            .field("api_base", &self.api_base)
            .field("symbols", &self.symbols)
            .finish_non_exhaustive()
    }
}

impl ImageSource {
    pub fn new(
        style_id: i64,
        api_base: String,
        symbols: Option<Vec<String>>,
        fetcher: Arc<dyn TileFetch>,
        tile_size: u32,
        stats: Stats,
    ) -> Self {
        ImageSource {
            style_id,
            api_base,
            symbols,
            fetcher,
            counter: AtomicU64::new(0),
            placeholder: Arc::new(super::transparent_tile(tile_size)),
            stats,
        }
    }

    /// Build the request URL for one extent, consuming the next cache-buster
    /// value so repeated identical requests are never browser-deduplicated.
    pub fn request_url(&self, extent: &GeometryExtent, width: u32, height: u32) -> String {
        let url = image_url(
            &self.api_base,
            self.style_id,
            extent,
            width,
            height,
            self.symbols.as_deref(),
        );
        let nd = self.counter.fetch_add(1, Ordering::SeqCst);
        set_url_param(&url, "nd", &nd.to_string())
    }

    /// Render one view extent. Failures resolve to the transparent
    /// placeholder; the map shows a blank image rather than an error.
    pub async fn render(&self, extent: &GeometryExtent, width: u32, height: u32) -> Arc<Vec<u8>> {
        let url = self.request_url(extent, width, height);
        self.stats.record_image();
        match self.fetcher.fetch(&url).await {
            Ok(bytes) => Arc::new(bytes),
            Err(err) => {
                tracing::warn!(style_id = self.style_id, error = %err, "image render failed");
                self.placeholder.clone()
            }
        }
    }
}
