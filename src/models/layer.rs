use serde::{Deserialize, Serialize};

/// Rendering strategy for a layer, selected by the configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    RasterTile,
    RasterImage,
    Vector,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LayerKind::RasterTile => "raster-tile",
            LayerKind::RasterImage => "raster-image",
            LayerKind::Vector => "vector",
        };
        f.write_str(s)
    }
}

/// Immutable configuration of one map layer, one per tree leaf.
///
/// Owned by the display; adapters read it to construct a live layer and
/// never mutate it. Runtime visibility/opacity live on [`crate::layer::LiveLayer`].
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    pub id: i64,
    pub title: String,
    pub kind: LayerKind,
    pub visibility: bool,
    /// 0.0 (fully transparent) ..= 1.0 (opaque).
    pub opacity: f64,
    pub min_resolution: Option<f64>,
    pub max_resolution: Option<f64>,
    pub style_id: i64,
    /// Vector layers only: symbol subset rendered into every tile request.
    pub symbols: Option<Vec<String>>,
}

impl LayerDescriptor {
    /// Whether the layer should be drawn at the given map resolution.
    pub fn visible_at(&self, resolution: f64) -> bool {
        if !self.visibility {
            return false;
        }
        if let Some(min) = self.min_resolution
            && resolution < min
        {
            return false;
        }
        if let Some(max) = self.max_resolution
            && resolution > max
        {
            return false;
        }
        true
    }
}
