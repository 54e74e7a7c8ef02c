use crate::error::{EngineError, Result};
use crate::events::{AnnotationEvent, EventBus, MapEvent};
use crate::models::annotation::{Annotation, AnnotationRecord};
use crate::models::geometry::GeometryExtent;
use crate::states::MapStates;
use crate::traits::{FeatureStore, ToolControl};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

/// Name of the tool state backing the draw interaction.
pub const ADD_ANNOTATION_STATE: &str = "annotation.add";

/// Feature source shared between the display layer and the edit overlay.
pub type FeatureSource = Arc<Mutex<BTreeMap<i64, Annotation>>>;

/// Map interactions attached to the edit overlay. Dropped wholesale when
/// editing ends so listeners cannot accumulate across edit sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Draw,
    Modify,
    Snap,
}

/// Transient editing layer. While it exists it references the *same*
/// feature source as the display layer, so edits are visible without a
/// separate re-render pass.
pub struct EditOverlay {
    source: FeatureSource,
    interactions: Vec<Interaction>,
}

impl EditOverlay {
    pub fn source(&self) -> &FeatureSource {
        &self.source
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }
}

/// Point-draw interaction registered as the `annotation.add` tool state.
///
/// `finish_sketch` models draw-end: the draft goes into the shared source
/// immediately (client-optimistic) and subscribers are told, but persistence
/// is somebody else's decision.
pub struct DrawTool {
    active: AtomicBool,
    source: FeatureSource,
    next_draft_id: Arc<AtomicI64>,
    bus: EventBus,
}

impl DrawTool {
    pub fn finish_sketch(&self, x: f64, y: f64) -> Option<i64> {
        if !self.is_active() {
            return None;
        }
        let draft_id = self.next_draft_id.fetch_sub(1, Ordering::SeqCst);
        self.source.lock().unwrap().insert(
            draft_id,
            Annotation {
                id: draft_id,
                x,
                y,
                description: String::new(),
                style: None,
            },
        );
        self.bus.publish(MapEvent::Annotation(AnnotationEvent::DraftCreated {
            draft_id,
            x,
            y,
        }));
        Some(draft_id)
    }
}

impl ToolControl for DrawTool {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Owns the annotation feature source and keeps it synchronized with the
/// backend feature collection.
pub struct AnnotationsManager {
    source: FeatureSource,
    overlay: Mutex<Option<Arc<EditOverlay>>>,
    store: Arc<dyn FeatureStore>,
    draw: Arc<DrawTool>,
    bus: EventBus,
}

impl std::fmt::Debug for AnnotationsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationsManager").finish_non_exhaustive()
    }
}

impl AnnotationsManager {
    pub fn new(store: Arc<dyn FeatureStore>, bus: EventBus) -> Self {
        let source: FeatureSource = Arc::new(Mutex::new(BTreeMap::new()));
        let draw = Arc::new(DrawTool {
            active: AtomicBool::new(false),
            source: source.clone(),
            next_draft_id: Arc::new(AtomicI64::new(-1)),
            bus: bus.clone(),
        });
        AnnotationsManager {
            source,
            overlay: Mutex::new(None),
            store,
            draw,
            bus,
        }
    }

    /// Register the draw interaction as a tool state.
    pub fn register(&self, states: &mut MapStates) -> Result<()> {
        states.add_state(ADD_ANNOTATION_STATE, self.draw.clone())
    }

    /// Activate the add-annotation tool, announcing the request first so
    /// panels can prepare.
    pub fn activate_add_tool(&self, states: &mut MapStates) -> bool {
        self.bus
            .publish(MapEvent::Annotation(AnnotationEvent::ActivateRequested));
        states.activate_state(ADD_ANNOTATION_STATE)
    }

    pub fn draw_tool(&self) -> &Arc<DrawTool> {
        &self.draw
    }

    pub fn source(&self) -> &FeatureSource {
        &self.source
    }

    /// Snapshot of the current annotation set, drafts included.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.source.lock().unwrap().values().cloned().collect()
    }

    /// One-shot fetch-then-index of the backend collection. Records whose
    /// geometry does not parse are skipped, not fatal.
    pub async fn load(&self) -> Result<usize> {
        let records = self
            .store
            .list()
            .await
            .map_err(EngineError::Network)?;
        let mut loaded = 0;
        {
            let mut source = self.source.lock().unwrap();
            for record in &records {
                if let Some(annotation) = record.to_annotation() {
                    source.insert(annotation.id, annotation);
                    loaded += 1;
                } else {
                    tracing::warn!(geom = %record.geom, "skipping unparseable annotation record");
                }
            }
        }
        self.bus
            .publish(MapEvent::Annotation(AnnotationEvent::Changed));
        Ok(loaded)
    }

    /// Persist a draft created on draw-end.
    ///
    /// On success the draft is re-keyed to the server-assigned id. On
    /// failure the draft is rolled back out of the shared source before the
    /// error propagates, so the overlay never keeps features the backend
    /// refused.
    pub async fn persist_draft(
        &self,
        draft_id: i64,
        description: String,
        style: Option<serde_json::Value>,
    ) -> Result<i64> {
        let draft = {
            let mut source = self.source.lock().unwrap();
            let mut draft = source.remove(&draft_id).ok_or_else(|| {
                EngineError::Configuration(format!("unknown draft annotation {}", draft_id))
            })?;
            draft.description = description;
            draft.style = style;
            source.insert(draft_id, draft.clone());
            draft
        };

        match self.store.create(AnnotationRecord::from_annotation(&draft)).await {
            Ok(server_id) => {
                let mut source = self.source.lock().unwrap();
                source.remove(&draft_id);
                source.insert(server_id, Annotation { id: server_id, ..draft });
                drop(source);
                self.bus
                    .publish(MapEvent::Annotation(AnnotationEvent::Changed));
                Ok(server_id)
            }
            Err(reason) => {
                self.source.lock().unwrap().remove(&draft_id);
                self.bus
                    .publish(MapEvent::Annotation(AnnotationEvent::Changed));
                Err(EngineError::Persistence {
                    op: "create",
                    reason,
                })
            }
        }
    }

    /// Update an existing annotation's description/style in place.
    pub async fn update(
        &self,
        id: i64,
        description: String,
        style: Option<serde_json::Value>,
    ) -> Result<()> {
        let updated = {
            let source = self.source.lock().unwrap();
            let mut annotation = source.get(&id).cloned().ok_or_else(|| {
                EngineError::Configuration(format!("unknown annotation {}", id))
            })?;
            annotation.description = description;
            annotation.style = style;
            annotation
        };

        self.store
            .update(id, AnnotationRecord::from_annotation(&updated))
            .await
            .map_err(|reason| EngineError::Persistence {
                op: "update",
                reason,
            })?;

        self.source.lock().unwrap().insert(id, updated);
        self.bus
            .publish(MapEvent::Annotation(AnnotationEvent::Changed));
        Ok(())
    }

    /// Delete the overlay feature and the backend record together. The
    /// local feature is only removed once the backend confirmed.
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store
            .delete(id)
            .await
            .map_err(|reason| EngineError::Persistence {
                op: "delete",
                reason,
            })?;
        self.source.lock().unwrap().remove(&id);
        self.bus
            .publish(MapEvent::Annotation(AnnotationEvent::Changed));
        Ok(())
    }

    /// Extent of one feature, for zoom-to-feature navigation.
    pub async fn feature_extent(&self, id: i64) -> Result<GeometryExtent> {
        self.store.extent(id).await.map_err(EngineError::Network)
    }

    /// Attach the edit overlay. The overlay shares the display source, so
    /// in-progress edits render without a second data path.
    pub fn start_editing(&self) -> Arc<EditOverlay> {
        let mut overlay = self.overlay.lock().unwrap();
        if let Some(existing) = overlay.as_ref() {
            return existing.clone();
        }
        let created = Arc::new(EditOverlay {
            source: self.source.clone(),
            interactions: vec![Interaction::Draw, Interaction::Modify, Interaction::Snap],
        });
        *overlay = Some(created.clone());
        created
    }

    /// Detach the overlay and discard its interactions.
    pub fn stop_editing(&self) {
        self.overlay.lock().unwrap().take();
    }

    pub fn is_editing(&self) -> bool {
        self.overlay.lock().unwrap().is_some()
    }

    /// The display-mode annotation layer is attached whenever the edit
    /// overlay is not: the two share one source but never render it
    /// concurrently.
    pub fn display_layer_attached(&self) -> bool {
        !self.is_editing()
    }
}
