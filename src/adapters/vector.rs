use crate::adapters::AdapterContext;
use crate::adapters::tiled::TiledSource;
use crate::api::render::tile_url_template;
use crate::error::Result;
use crate::layer::{LayerSource, LiveLayer};
use crate::models::layer::{LayerDescriptor, LayerKind};
use crate::traits::LayerAdapter;
use crate::utils::query::set_url_param;

/// Vector layers ride the XYZ tile machinery; the only difference is the
/// optional symbols override merged into the URL template's query string
/// without disturbing the surrounding parameters.
pub struct VectorAdapter {
    ctx: AdapterContext,
}

impl VectorAdapter {
    pub fn new(ctx: AdapterContext) -> Self {
        VectorAdapter { ctx }
    }
}

impl LayerAdapter for VectorAdapter {
    fn kind(&self) -> LayerKind {
        LayerKind::Vector
    }

    fn create_layer(&self, descriptor: &LayerDescriptor) -> Result<LiveLayer> {
        let mut template = tile_url_template(
            &self.ctx.api_base,
            descriptor.style_id,
            super::style_generation(),
        );
        if let Some(symbols) = &descriptor.symbols {
            template = set_url_param(&template, "symbols", &symbols.join(","));
        }
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
            LayerSource::Vector(source),
            self.ctx.bus.clone(),
        ))
    }
}
