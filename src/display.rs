use crate::adapters::{AdapterContext, AdapterRegistry};
use crate::annotations::AnnotationsManager;
use crate::api::HttpTileFetch;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::events::EventBus;
use crate::geometry::projection::lon_lat_to_mercator;
use crate::layer::LiveLayer;
use crate::map::MapView;
use crate::models::tree::TreeNode;
use crate::panels::PanelStack;
use crate::plugins::{MenuItem, PluginRegistry};
use crate::states::MapStates;
use crate::toolbar::{ToggleButton, ToolbarController};
use crate::tools::{IdentifyTool, MeasureTool, PanTool, SwipeTool};
use crate::traits::{FeatureStore, TileFetch, ToolControl};
use crate::utils::status::Stats;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

/// Optional wiring for [`Display::new`]; everything has a production
/// default.
#[derive(Default)]
pub struct DisplayOptions {
    /// Byte fetch for tiles and images; defaults to the reqwest client.
    pub fetcher: Option<Arc<dyn TileFetch>>,
    /// Annotation persistence; annotations are disabled without it.
    pub feature_store: Option<Arc<dyn FeatureStore>>,
    /// Shared tool-state registry. Pass the same instance to several
    /// displays to get page-wide tool exclusivity; defaults to an isolated
    /// registry.
    pub states: Option<Arc<Mutex<MapStates>>>,
    /// Viewport size in pixels.
    pub viewport: Option<(u32, u32)>,
}

/// Root orchestrator: owns the map view, the live layer registry, the tool
/// state machine and the panel/plugin wiring, and exposes the contract the
/// surrounding CRUD UI talks to.
#[derive(Debug)]
pub struct Display {
    config: Config,
    tree: TreeNode,
    map: Mutex<MapView>,
    bus: EventBus,
    stats: Stats,
    states: Arc<Mutex<MapStates>>,
    toolbar: ToolbarController,
    buttons: HashMap<String, Arc<ToggleButton>>,
    layers: BTreeMap<i64, Arc<LiveLayer>>,
    layer_order: Vec<i64>,
    plugins: PluginRegistry,
    panels: Mutex<PanelStack>,
    annotations: Option<AnnotationsManager>,
    selected: Mutex<Option<i64>>,
}

impl Display {
    pub fn new(config: Config, tree: TreeNode, options: DisplayOptions) -> Result<Self> {
        let bus = EventBus::default();
        let stats = Stats::default();
        let fetcher = options
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpTileFetch::default()));
        let states = options
            .states
            .unwrap_or_else(|| Arc::new(Mutex::new(MapStates::new(bus.clone()))));
        let toolbar = ToolbarController::new(states.clone());
        let (width, height) = options.viewport.unwrap_or((1024, 768));

        let registry = AdapterRegistry::with_defaults(AdapterContext {
            api_base: config.api_base.clone(),
            tile_size: config.tile_size,
            cache_capacity: config.tile_cache_capacity,
            fetcher,
            bus: bus.clone(),
            stats: stats.clone(),
        });

        let mut layers = BTreeMap::new();
        let mut layer_order = Vec::new();
        let mut leaves = Vec::new();
        tree.walk_layers(&mut leaves);
        for leaf in leaves {
            let descriptor = leaf
                .to_descriptor()
                .ok_or_else(|| EngineError::Configuration("group node among leaves".into()))?;
            if layers.contains_key(&descriptor.id) {
                return Err(EngineError::Configuration(format!(
                    "layer {} appears twice in the tree",
                    descriptor.id
                )));
            }
            layer_order.push(descriptor.id);
            layers.insert(descriptor.id, Arc::new(registry.create(&descriptor)?));
        }

        let mut display = Display {
            map: Mutex::new(MapView::new(width, height, config.tile_size)),
            bus: bus.clone(),
            stats,
            states,
            toolbar,
            buttons: HashMap::new(),
            layers,
            layer_order,
            plugins: PluginRegistry::with_defaults(),
            panels: Mutex::new(PanelStack::new()),
            annotations: None,
            selected: Mutex::new(None),
            tree,
            config,
        };

        display.bind_standard_tool("pan", Arc::new(PanTool::default()))?;
        display.bind_standard_tool("identify", Arc::new(IdentifyTool::default()))?;
        display.bind_standard_tool("swipe", Arc::new(SwipeTool::default()))?;
        display.bind_standard_tool("measure", Arc::new(MeasureTool::default()))?;

        if let Some(store) = options.feature_store {
            let manager = AnnotationsManager::new(store, bus);
            {
                let mut states = display.states.lock().unwrap();
                if !states.is_registered(crate::annotations::ADD_ANNOTATION_STATE) {
                    manager.register(&mut states)?;
                }
            }
            display.annotations = Some(manager);
        }

        if let Some(default_tool) = display.config.default_tool.clone() {
            let mut states = display.states.lock().unwrap();
            if states.is_registered(&default_tool) {
                states.set_default_state(&default_tool, true)?;
            }
        }

        {
            let mut map = display.map.lock().unwrap();
            if let Some([lon, lat]) = display.config.initial_center {
                let (x, y) = lon_lat_to_mercator(lon, lat);
                map.set_center(x, y);
            }
            if let Some(zoom) = display.config.initial_zoom {
                map.set_zoom(zoom);
            }
        }

        Ok(display)
    }

    /// Bind one of the stock tools, skipping names already present on a
    /// shared registry.
    fn bind_standard_tool(&mut self, name: &str, tool: Arc<dyn ToolControl>) -> Result<()> {
        if self.states.lock().unwrap().is_registered(name) {
            return Ok(());
        }
        let button = ToggleButton::new();
        self.toolbar.bind(name, tool, button.clone())?;
        self.buttons.insert(name.to_string(), button);
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn states(&self) -> &Arc<Mutex<MapStates>> {
        &self.states
    }

    pub fn toolbar_button(&self, name: &str) -> Option<&Arc<ToggleButton>> {
        self.buttons.get(name)
    }

    pub fn annotations(&self) -> Option<&AnnotationsManager> {
        self.annotations.as_ref()
    }

    pub fn panels(&self) -> MutexGuard<'_, PanelStack> {
        self.panels.lock().unwrap()
    }

    // --- layers -----------------------------------------------------------

    pub fn layer(&self, layer_id: i64) -> Option<&Arc<LiveLayer>> {
        self.layers.get(&layer_id)
    }

    /// Live layers in tree order.
    pub fn layers(&self) -> Vec<Arc<LiveLayer>> {
        self.layer_order
            .iter()
            .filter_map(|id| self.layers.get(id).cloned())
            .collect()
    }

    pub fn set_layer_visibility(&self, layer_id: i64, visibility: bool) -> bool {
        match self.layers.get(&layer_id) {
            Some(layer) => {
                layer.set_visibility(visibility);
                true
            }
            None => false,
        }
    }

    pub fn set_layer_opacity(&self, layer_id: i64, opacity: f64) -> bool {
        match self.layers.get(&layer_id) {
            Some(layer) => {
                layer.set_opacity(opacity);
                true
            }
            None => false,
        }
    }

    // --- tools ------------------------------------------------------------

    pub fn active_tool(&self) -> Option<String> {
        self.states
            .lock()
            .unwrap()
            .current_state()
            .map(str::to_string)
    }

    pub fn activate_tool(&self, name: &str) -> bool {
        self.states.lock().unwrap().activate_state(name)
    }

    pub fn deactivate_tool(&self, name: &str) -> bool {
        self.states.lock().unwrap().deactivate_state(name)
    }

    // --- map view ---------------------------------------------------------

    pub fn view(&self) -> MapView {
        self.map.lock().unwrap().clone()
    }

    pub fn set_view(&self, x: f64, y: f64, zoom: u8) {
        let mut map = self.map.lock().unwrap();
        map.set_center(x, y);
        map.set_zoom(zoom);
    }

    /// Issue tile requests for every layer drawable at the current view.
    /// Returns how many tiles were requested.
    pub fn request_visible_tiles(&self) -> usize {
        let map = self.map.lock().unwrap().clone();
        let resolution = map.resolution();
        let tiles = map.visible_tiles();
        let mut requested = 0;
        for layer in self.layers() {
            if !layer.visibility() || !layer.descriptor().visible_at(resolution) {
                continue;
            }
            if let Some(source) = layer.source().as_tiled() {
                for &(z, x, y) in &tiles {
                    source.request_tile(z, x, y);
                    requested += 1;
                }
            }
        }
        requested
    }

    /// Zoom the view onto one annotation's extent.
    pub async fn zoom_to_annotation(&self, id: i64) -> Result<()> {
        let manager = self.annotations.as_ref().ok_or_else(|| {
            EngineError::Configuration("annotations are not enabled for this display".into())
        })?;
        let extent = manager.feature_extent(id).await?;
        self.map.lock().unwrap().fit_extent(&extent);
        Ok(())
    }

    // --- selection, plugins, panels ----------------------------------------

    fn find_node<'a>(node: &'a TreeNode, id: i64) -> Option<&'a TreeNode> {
        if node.id() == id {
            return Some(node);
        }
        match node {
            TreeNode::Group { children, .. } => {
                children.iter().find_map(|child| Self::find_node(child, id))
            }
            TreeNode::Layer { .. } => None,
        }
    }

    /// Change the selected tree node, returning the contextual menu for it.
    pub fn select_node(&self, node_id: i64) -> Option<Vec<MenuItem>> {
        let node = Self::find_node(&self.tree, node_id)?;
        *self.selected.lock().unwrap() = Some(node_id);
        Some(self.plugins.menu_for(node))
    }

    pub fn selected_node(&self) -> Option<i64> {
        *self.selected.lock().unwrap()
    }

    /// Open the panel of a plugin against the current selection.
    ///
    /// Idempotent per resource: when the tab already exists it is
    /// re-selected and `Ok(false)` is returned.
    pub fn open_plugin(&self, identity: &str) -> Result<bool> {
        let plugin = self.plugins.get(identity).ok_or_else(|| {
            EngineError::Configuration(format!("unknown plugin '{}'", identity))
        })?;
        let Some(selected) = self.selected_node() else {
            return Ok(false);
        };
        let Some(node) = Self::find_node(&self.tree, selected) else {
            return Ok(false);
        };
        if !plugin.applies_to(node) {
            return Ok(false);
        }
        Ok(self.panels.lock().unwrap().open(plugin.open(node)))
    }
}
