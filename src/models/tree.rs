use crate::models::layer::{LayerDescriptor, LayerKind};
use serde::Deserialize;
use std::collections::HashMap;

/// One node of the declarative layer tree consumed from the backend.
///
/// The wire format is camelCase JSON with a `type` discriminator, e.g.:
///
/// ```json
/// {"id": 1, "type": "group", "displayName": "Base", "children": [
///   {"id": 2, "type": "layer", "displayName": "OSM", "layerId": 10,
///    "styleId": 11, "kind": "raster-tile", "visibility": true}
/// ]}
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TreeNode {
    #[serde(rename_all = "camelCase")]
    Group {
        id: i64,
        display_name: String,
        #[serde(default)]
        children: Vec<TreeNode>,
    },
    #[serde(rename_all = "camelCase")]
    Layer {
        id: i64,
        display_name: String,
        layer_id: i64,
        style_id: i64,
        kind: LayerKind,
        #[serde(default = "default_visibility")]
        visibility: bool,
        /// Percentage 0..100 as sent by the backend; 0 means opaque.
        #[serde(default)]
        transparency: Option<f64>,
        #[serde(default)]
        min_resolution: Option<f64>,
        #[serde(default)]
        max_resolution: Option<f64>,
        #[serde(default)]
        symbols: Option<Vec<String>>,
        /// Per-plugin configuration keyed by plugin identity.
        #[serde(default, rename = "plugin")]
        plugins: HashMap<String, serde_json::Value>,
    },
}

fn default_visibility() -> bool {
    true
}

impl TreeNode {
    pub fn id(&self) -> i64 {
        match self {
            TreeNode::Group { id, .. } | TreeNode::Layer { id, .. } => *id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            TreeNode::Group { display_name, .. } | TreeNode::Layer { display_name, .. } => {
                display_name
            }
        }
    }

    pub fn is_layer(&self) -> bool {
        matches!(self, TreeNode::Layer { .. })
    }

    /// Plugin configuration attached to this node, if any.
    pub fn plugin_config(&self, identity: &str) -> Option<&serde_json::Value> {
        match self {
            TreeNode::Layer { plugins, .. } => plugins.get(identity),
            TreeNode::Group { .. } => None,
        }
    }

    /// Depth-first iteration over all layer leaves under this node.
    pub fn walk_layers<'a>(&'a self, out: &mut Vec<&'a TreeNode>) {
        match self {
            TreeNode::Layer { .. } => out.push(self),
            TreeNode::Group { children, .. } => {
                for child in children {
                    child.walk_layers(out);
                }
            }
        }
    }

    /// Build the immutable layer descriptor for a layer leaf.
    ///
    /// Returns `None` for group nodes. Wire transparency (0..100, 0 opaque)
    /// converts to opacity (1.0 opaque); out-of-range values are clamped.
    pub fn to_descriptor(&self) -> Option<LayerDescriptor> {
        match self {
            TreeNode::Group { .. } => None,
            TreeNode::Layer {
                display_name,
                layer_id,
                style_id,
                kind,
                visibility,
                transparency,
                min_resolution,
                max_resolution,
                symbols,
                ..
            } => Some(LayerDescriptor {
                id: *layer_id,
                title: display_name.clone(),
                kind: *kind,
                visibility: *visibility,
                opacity: 1.0 - transparency.unwrap_or(0.0).clamp(0.0, 100.0) / 100.0,
                min_resolution: *min_resolution,
                max_resolution: *max_resolution,
                style_id: *style_id,
                symbols: symbols.clone(),
            }),
        }
    }
}
