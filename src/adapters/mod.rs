use crate::error::{EngineError, Result};
use crate::events::EventBus;
use crate::layer::{LayerSource, LiveLayer};
use crate::models::layer::{LayerDescriptor, LayerKind};
use crate::traits::{LayerAdapter, TileFetch};
use crate::utils::status::Stats;
use ::image::{ColorType, ImageEncoder, RgbaImage, codecs::png::PngEncoder};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod image;
pub mod tiled;
pub mod vector;

pub use image::ImageSource;
pub use tiled::TiledSource;

/// Shared dependencies injected into every adapter.
#[derive(Clone)]
pub struct AdapterContext {
    pub api_base: String,
    pub tile_size: u32,
    pub cache_capacity: u64,
    pub fetcher: Arc<dyn TileFetch>,
    pub bus: EventBus,
    pub stats: Stats,
}

/// Transparent PNG used wherever a fetch fails: the map draws a blank tile
/// instead of surfacing an error.
pub fn transparent_tile(size: u32) -> Vec<u8> {
    let img = RgbaImage::new(size, size);
    let mut png_data = Vec::new();
    PngEncoder::new(Cursor::new(&mut png_data))
        .write_image(img.as_raw(), size, size, ColorType::Rgba8.into())
        .expect("encoding an in-memory PNG cannot fail");
    png_data
}

/// Style generation marker baked into tile URL templates, so the browser
/// cache rolls over when the layer is re-created.
fn style_generation() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// XYZ raster tiles.
pub struct TiledAdapter {
    ctx: AdapterContext,
}

impl TiledAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        TiledAdapter { ctx }
    }
}

impl LayerAdapter for TiledAdapter {
    fn kind(&self) -> LayerKind {
        LayerKind::RasterTile
    }

    fn create_layer(&self, descriptor: &LayerDescriptor) -> Result<LiveLayer> {
        let template = crate::api::tile_url_template(
            &self.ctx.api_base,
            descriptor.style_id,
            style_generation(),
        );
        let source = TiledSource::new(
            descriptor.id,
            template,
            self.ctx.fetcher.clone(),
            self.ctx.cache_capacity,
            self.ctx.tile_size,
            self.ctx.bus.clone(),
            self.ctx.stats.clone(),
        );
        Ok(LiveLayer::new(
            descriptor.clone(),
            LayerSource::Tiled(source),
            self.ctx.bus.clone(),
        ))
    }
}

/// WMS-style single-image rendering.
pub struct ImageAdapter {
    ctx: AdapterContext,
}

impl ImageAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        ImageAdapter { ctx }
    }
}

impl LayerAdapter for ImageAdapter {
    fn kind(&self) -> LayerKind {
        LayerKind::RasterImage
    }

    fn create_layer(&self, descriptor: &LayerDescriptor) -> Result<LiveLayer> {
        let source = ImageSource::new(
            descriptor.style_id,
            self.ctx.api_base.clone(),
            descriptor.symbols.clone(),
            self.ctx.fetcher.clone(),
            self.ctx.tile_size,
            self.ctx.stats.clone(),
        );
        Ok(LiveLayer::new(
            descriptor.clone(),
            LayerSource::Image(source),
            self.ctx.bus.clone(),
        ))
    }
}

/// Maps a descriptor's kind to its adapter. A kind without an adapter is a
/// broken deployment, reported at construction time.
pub struct AdapterRegistry {
    adapters: HashMap<LayerKind, Arc<dyn LayerAdapter>>,
}

impl AdapterRegistry {
    pub fn with_defaults(ctx: AdapterContext) -> Self {
        let mut registry = AdapterRegistry {
            adapters: HashMap::new(),
        };
        registry.register(Arc::new(TiledAdapter::new(ctx.clone())));
        registry.register(Arc::new(ImageAdapter::new(ctx.clone())));
        registry.register(Arc::new(vector::VectorAdapter::new(ctx)));
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn LayerAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    pub fn create(&self, descriptor: &LayerDescriptor) -> Result<LiveLayer> {
        let adapter = self.adapters.get(&descriptor.kind).ok_or_else(|| {
            EngineError::Configuration(format!(
                "no layer adapter registered for kind '{}'",
                descriptor.kind
            ))
        })?;
        adapter.create_layer(descriptor)
    }
}
