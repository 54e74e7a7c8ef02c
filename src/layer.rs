use crate::adapters::image::ImageSource;
use crate::adapters::tiled::TiledSource;
use crate::events::{EventBus, MapEvent};
use crate::models::layer::LayerDescriptor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The native renderer's view of one map layer.
///
/// Stands in for the underlying map widget's layer object: the engine writes
/// visibility/opacity into it, and native UI interactions read back through
/// [`LiveLayer::sync_from_renderer`]. The write counter exists so the
/// feedback-loop invariant is observable.
#[derive(Debug, Default)]
pub struct RendererHandle {
    visibility: AtomicBool,
    opacity: Mutex<f64>,
    writes: AtomicU64,
}

impl RendererHandle {
    pub fn visibility(&self) -> bool {
        self.visibility.load(Ordering::SeqCst)
    }

    pub fn opacity(&self) -> f64 {
        *self.opacity.lock().unwrap()
    }

    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn write_visibility(&self, value: bool) {
        self.visibility.store(value, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn write_opacity(&self, value: f64) {
        *self.opacity.lock().unwrap() = value;
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Data-fetch strategy attached to a live layer.
#[derive(Debug)]
pub enum LayerSource {
    Tiled(TiledSource),
    Image(ImageSource),
    /// Vector tiles ride the same XYZ machinery; the symbols override is
    /// merged into the URL template at creation time.
    Vector(TiledSource),
}

impl LayerSource {
    pub fn as_tiled(&self) -> Option<&TiledSource> {
        match self {
            LayerSource::Tiled(source) | LayerSource::Vector(source) => Some(source),
            LayerSource::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageSource> {
        match self {
            LayerSource::Image(source) => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderState {
    visibility: bool,
    opacity: f64,
}

/// Runtime pairing of a map layer and its data source.
///
/// Visibility and opacity are two-way bound: descriptor-side setters push
/// into the renderer, renderer-originated changes come back through
/// `sync_from_renderer`. Both directions compare before writing, so a value
/// bouncing between the two sides settles instead of looping.
#[derive(Debug)]
pub struct LiveLayer {
    descriptor: LayerDescriptor,
    state: Mutex<RenderState>,
    renderer: RendererHandle,
    source: LayerSource,
    bus: EventBus,
}

impl LiveLayer {
    pub fn new(descriptor: LayerDescriptor, source: LayerSource, bus: EventBus) -> Self {
        let renderer = RendererHandle::default();
        renderer.write_visibility(descriptor.visibility);
        renderer.write_opacity(descriptor.opacity);
        LiveLayer {
            state: Mutex::new(RenderState {
                visibility: descriptor.visibility,
                opacity: descriptor.opacity,
            }),
            descriptor,
            renderer,
            source,
            bus,
        }
    }

    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    pub fn source(&self) -> &LayerSource {
        &self.source
    }

    pub fn renderer(&self) -> &RendererHandle {
        &self.renderer
    }

    pub fn visibility(&self) -> bool {
        self.state.lock().unwrap().visibility
    }

    pub fn opacity(&self) -> f64 {
        self.state.lock().unwrap().opacity
    }

    /// Descriptor-side setter; pushes into the renderer only on change.
    pub fn set_visibility(&self, value: bool) {
        {
            let mut state = self.state.lock().unwrap();
            if state.visibility == value {
                return;
            }
            state.visibility = value;
        }
        self.renderer.write_visibility(value);
        self.publish_change();
    }

    /// Descriptor-side setter; pushes into the renderer only on change.
    pub fn set_opacity(&self, value: f64) {
        let value = value.clamp(0.0, 1.0);
        {
            let mut state = self.state.lock().unwrap();
            if state.opacity == value {
                return;
            }
            state.opacity = value;
        }
        self.renderer.write_opacity(value);
        self.publish_change();
    }

    /// Renderer-originated change event, reconciled back into the
    /// descriptor-facing state. Never writes back into the renderer.
    pub fn sync_from_renderer(&self, visibility: bool, opacity: f64) {
        let changed = {
            let mut state = self.state.lock().unwrap();
            let next = RenderState {
                visibility,
                opacity,
            };
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        };
        if changed {
            self.publish_change();
        }
    }

    fn publish_change(&self) {
        let state = *self.state.lock().unwrap();
        self.bus.publish(MapEvent::LayerChanged {
            layer_id: self.descriptor.id,
            visibility: state.visibility,
            opacity: state.opacity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::tiled::TiledSource;
    use crate::models::layer::LayerKind;
    use crate::traits::TileFetch;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NullFetch;

    #[async_trait]
    impl TileFetch for NullFetch {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
            Ok(Vec::new())
        }
    }

    fn make_layer(visibility: bool, opacity: f64) -> LiveLayer {
        let descriptor = LayerDescriptor {
            id: 1,
            title: "osm".to_string(),
            kind: LayerKind::RasterTile,
            visibility,
            opacity,
            min_resolution: None,
            max_resolution: None,
            style_id: 2,
            symbols: None,
        };
        let bus = EventBus::default();
        let source = LayerSource::Tiled(TiledSource::new(
            1,
            "https://gis/api/tile?z={z}&x={x}&y={y}".to_string(),
            Arc::new(NullFetch),
            16,
            256,
            bus.clone(),
            Default::default(),
        ));
        LiveLayer::new(descriptor, source, bus)
    }

    #[test]
    fn descriptor_state_reads_back() {
        let layer = make_layer(true, 1.0);
        assert!(layer.visibility());
        assert_eq!(layer.opacity(), 1.0);
        assert!(layer.renderer().visibility());
        assert_eq!(layer.renderer().opacity(), 1.0);
    }

    #[test]
    fn set_opacity_updates_in_place() {
        let layer = make_layer(true, 1.0);
        layer.set_opacity(0.5);
        assert_eq!(layer.opacity(), 0.5);
        assert_eq!(layer.renderer().opacity(), 0.5);
    }

    #[test]
    fn same_value_write_does_not_touch_renderer() {
        let layer = make_layer(true, 1.0);
        let writes_before = layer.renderer().write_count();
        layer.set_opacity(1.0);
        layer.set_visibility(true);
        assert_eq!(layer.renderer().write_count(), writes_before);
    }

    #[test]
    fn renderer_sync_does_not_write_back() {
        let layer = make_layer(true, 1.0);
        let writes_before = layer.renderer().write_count();
        layer.sync_from_renderer(false, 0.25);
        assert!(!layer.visibility());
        assert_eq!(layer.opacity(), 0.25);
        // no renderer write happened: the change originated there
        assert_eq!(layer.renderer().write_count(), writes_before);
    }

    #[tokio::test]
    async fn changes_publish_only_when_value_differs() {
        let layer = make_layer(true, 1.0);
        let mut rx = layer.bus.subscribe();
        layer.sync_from_renderer(true, 1.0); // no-op
        layer.set_opacity(0.5);
        match rx.recv().await.unwrap() {
            MapEvent::LayerChanged { opacity, .. } => assert_eq!(opacity, 0.5),
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }
}
