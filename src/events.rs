use tokio::sync::broadcast;

/// Annotation lifecycle events, decoupling the draw interaction from
/// persistence and dialog UI.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEvent {
    /// The "add annotation" tool was activated.
    ActivateRequested,
    /// Draw-end produced a draft feature; the subscriber decides whether to
    /// open an editor dialog and persist it.
    DraftCreated { draft_id: i64, x: f64, y: f64 },
    /// The annotation set changed (load, create, update, delete).
    Changed,
}

/// Process-local events published by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    ToolActivated(String),
    ToolDeactivated(String),
    Annotation(AnnotationEvent),
    LayerChanged {
        layer_id: i64,
        visibility: bool,
        opacity: f64,
    },
    TileLoaded {
        layer_id: i64,
        z: u8,
        x: u32,
        y: u32,
    },
}

/// Typed pub/sub bus. Publishers do not know their subscribers; publishing
/// with no subscribers drops the event.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MapEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        EventBus { sender }
    }

    pub fn publish(&self, event: MapEvent) {
        // a bus with no subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(MapEvent::ToolActivated("identify".to_string()));
        assert_eq!(
            rx.recv().await.unwrap(),
            MapEvent::ToolActivated("identify".to_string())
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(MapEvent::Annotation(AnnotationEvent::Changed));
    }

    #[tokio::test]
    async fn events_arrive_in_emission_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        for i in 0..5 {
            bus.publish(MapEvent::TileLoaded {
                layer_id: 1,
                z: i,
                x: 0,
                y: 0,
            });
        }
        for i in 0..5 {
            match rx.recv().await.unwrap() {
                MapEvent::TileLoaded { z, .. } => assert_eq!(z, i),
                other => panic!("unexpected event {:?}", other),
            }
        }
    }
}
