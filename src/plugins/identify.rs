use crate::models::tree::TreeNode;
use crate::panels::PanelTab;
use crate::plugins::WebmapPlugin;
use serde_json::json;

/// Click-to-inspect results panel; available on every layer leaf.
pub struct IdentifyPlugin;

impl WebmapPlugin for IdentifyPlugin {
    fn identity(&self) -> &str {
        "identify"
    }

    fn order(&self) -> i32 {
        30
    }

    fn menu_label(&self) -> &str {
        "Identify"
    }

    fn applies_to(&self, node: &TreeNode) -> bool {
        node.is_layer()
    }

    fn open(&self, node: &TreeNode) -> PanelTab {
        let layer_id = match node {
            TreeNode::Layer { layer_id, .. } => *layer_id,
            TreeNode::Group { .. } => node.id(),
        };
        PanelTab {
            key: format!("identify:{}", layer_id),
            label: format!("Identify: {}", node.display_name()),
            payload: json!({ "layerId": layer_id }),
        }
    }
}
