use crate::models::tree::TreeNode;
use crate::panels::PanelTab;
use crate::plugins::WebmapPlugin;
use serde_json::{Value, json};

/// Shows the layer description configured on the tree node.
pub struct DescriptionPlugin;

impl WebmapPlugin for DescriptionPlugin {
    fn identity(&self) -> &str {
        "description"
    }

    fn order(&self) -> i32 {
        20
    }

    fn menu_label(&self) -> &str {
        "Description"
    }

    fn applies_to(&self, node: &TreeNode) -> bool {
        node.plugin_config(self.identity()).is_some()
    }

    fn open(&self, node: &TreeNode) -> PanelTab {
        let config = node
            .plugin_config(self.identity())
            .cloned()
            .unwrap_or(Value::Null);
        PanelTab {
            key: format!("description:{}", node.id()),
            label: node.display_name().to_string(),
            payload: json!({ "description": config }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::LayerKind;
    use crate::plugins::tests::layer_node;

    #[test]
    fn applies_only_with_description_config() {
        let plugin = DescriptionPlugin;
        assert!(plugin.applies_to(&layer_node(LayerKind::RasterTile, true)));
        assert!(!plugin.applies_to(&layer_node(LayerKind::RasterTile, false)));
    }

    #[test]
    fn tab_carries_the_configured_text() {
        let plugin = DescriptionPlugin;
        let tab = plugin.open(&layer_node(LayerKind::RasterTile, true));
        assert_eq!(tab.key, "description:2");
        assert_eq!(tab.payload["description"]["text"], "about this layer");
    }
}
