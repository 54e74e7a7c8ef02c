use crate::models::tree::TreeNode;
use crate::panels::PanelTab;
use std::sync::Arc;

pub mod description;
pub mod feature_table;
pub mod identify;

pub use description::DescriptionPlugin;
pub use feature_table::FeatureTablePlugin;
pub use identify::IdentifyPlugin;

/// Per-layer capability: evaluated against the selected tree node, rendered
/// as a menu affordance when applicable, opened into a panel tab on demand.
///
/// Plugins are stateless; per-layer configuration comes from the node's
/// `plugin` map at evaluation time.
pub trait WebmapPlugin: Send + Sync {
    fn identity(&self) -> &str;
    /// Position weight in the contextual menu; lower sorts earlier.
    fn order(&self) -> i32;
    fn menu_label(&self) -> &str;
    fn applies_to(&self, node: &TreeNode) -> bool;
    fn open(&self, node: &TreeNode) -> PanelTab;
}

/// One rendered menu affordance.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub identity: String,
    pub label: String,
    pub order: i32,
}

/// Insert into an order-sorted menu: the new item lands at the first
/// position whose neighbouring orders bracket it, so equal orders keep
/// their insertion sequence.
pub fn insert_ordered(menu: &mut Vec<MenuItem>, item: MenuItem) {
    let position = menu
        .iter()
        .position(|existing| existing.order > item.order)
        .unwrap_or(menu.len());
    menu.insert(position, item);
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn WebmapPlugin>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field(
                "plugins",
                &self.plugins.iter().map(|p| p.identity()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(FeatureTablePlugin));
        registry.register(Arc::new(DescriptionPlugin));
        registry.register(Arc::new(IdentifyPlugin));
        registry
    }

    pub fn register(&mut self, plugin: Arc<dyn WebmapPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn get(&self, identity: &str) -> Option<&Arc<dyn WebmapPlugin>> {
        self.plugins
            .iter()
            .find(|plugin| plugin.identity() == identity)
    }

    pub fn identities(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.identity()).collect()
    }

    /// Menu affordances for the given selection, ordered.
    pub fn menu_for(&self, node: &TreeNode) -> Vec<MenuItem> {
        let mut menu = Vec::new();
        for plugin in &self.plugins {
            if plugin.applies_to(node) {
                insert_ordered(
                    &mut menu,
                    MenuItem {
                        identity: plugin.identity().to_string(),
                        label: plugin.menu_label().to_string(),
                        order: plugin.order(),
                    },
                );
            }
        }
        menu
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::layer::LayerKind;
    use serde_json::Value;

    pub(crate) fn layer_node(kind: LayerKind, with_description: bool) -> TreeNode {
        let plugin = if with_description {
            r#", "plugin": {"description": {"text": "about this layer"}}"#
        } else {
            ""
        };
        let json = format!(
            r#"{{"id": 2, "type": "layer", "displayName": "Roads", "layerId": 10,
                 "styleId": 11, "kind": "{}"{}}}"#,
            kind, plugin
        );
        serde_json::from_str(&json).unwrap()
    }

    struct DummyPlugin {
        identity: &'static str,
        order: i32,
    }

    impl WebmapPlugin for DummyPlugin {
        fn identity(&self) -> &str {
            self.identity
        }
        fn order(&self) -> i32 {
            self.order
        }
        fn menu_label(&self) -> &str {
            self.identity
        }
        fn applies_to(&self, _node: &TreeNode) -> bool {
            true
        }
        fn open(&self, _node: &TreeNode) -> PanelTab {
            PanelTab {
                key: self.identity.to_string(),
                label: self.identity.to_string(),
                payload: Value::Null,
            }
        }
    }

    #[test]
    fn menu_respects_declared_order_with_stable_ties() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(DummyPlugin { identity: "c", order: 30 }));
        registry.register(Arc::new(DummyPlugin { identity: "a", order: 10 }));
        registry.register(Arc::new(DummyPlugin { identity: "b1", order: 20 }));
        registry.register(Arc::new(DummyPlugin { identity: "b2", order: 20 }));

        let node = layer_node(LayerKind::Vector, false);
        let menu: Vec<_> = registry
            .menu_for(&node)
            .into_iter()
            .map(|item| item.identity)
            .collect();
        assert_eq!(menu, vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn default_plugins_apply_by_capability() {
        let registry = PluginRegistry::with_defaults();

        let vector = layer_node(LayerKind::Vector, false);
        let identities: Vec<_> = registry
            .menu_for(&vector)
            .into_iter()
            .map(|item| item.identity)
            .collect();
        assert_eq!(identities, vec!["feature-table", "identify"]);

        let raster = layer_node(LayerKind::RasterTile, true);
        let identities: Vec<_> = registry
            .menu_for(&raster)
            .into_iter()
            .map(|item| item.identity)
            .collect();
        assert_eq!(identities, vec!["description", "identify"]);
    }
}
