use crate::models::layer::LayerKind;
use crate::models::tree::TreeNode;
use crate::panels::PanelTab;
use crate::plugins::WebmapPlugin;
use serde_json::json;

/// Attribute table for vector layers.
pub struct FeatureTablePlugin;

impl WebmapPlugin for FeatureTablePlugin {
    fn identity(&self) -> &str {
        "feature-table"
    }

    fn order(&self) -> i32 {
        10
    }

    fn menu_label(&self) -> &str {
        "Feature table"
    }

    fn applies_to(&self, node: &TreeNode) -> bool {
        matches!(
            node,
            TreeNode::Layer {
                kind: LayerKind::Vector,
                ..
            }
        )
    }

    fn open(&self, node: &TreeNode) -> PanelTab {
        let (layer_id, config) = match node {
            TreeNode::Layer { layer_id, .. } => {
                (*layer_id, node.plugin_config(self.identity()).cloned())
            }
            TreeNode::Group { .. } => (node.id(), None),
        };
        PanelTab {
            key: format!("feature-table:{}", layer_id),
            label: format!("Features of {}", node.display_name()),
            payload: json!({ "layerId": layer_id, "config": config }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::tests::layer_node;

    #[test]
    fn applies_only_to_vector_layers() {
        let plugin = FeatureTablePlugin;
        assert!(plugin.applies_to(&layer_node(LayerKind::Vector, false)));
        assert!(!plugin.applies_to(&layer_node(LayerKind::RasterTile, false)));
    }

    #[test]
    fn tab_key_is_stable_per_layer() {
        let plugin = FeatureTablePlugin;
        let node = layer_node(LayerKind::Vector, false);
        let first = plugin.open(&node);
        let second = plugin.open(&node);
        assert_eq!(first.key, "feature-table:10");
        assert_eq!(first.key, second.key);
    }
}
