use crate::events::{EventBus, MapEvent};
use crate::traits::TileFetch;
use crate::utils::status::Stats;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;

struct Inflight {
    zoom: u8,
    generation: u64,
    abort: AbortHandle,
}

/// XYZ tile source with a managed request lifecycle.
///
/// Every in-flight request is tracked under its `"z-x-y"` key. A new request
/// captures the current zoom and aborts all in-flight requests whose
/// captured zoom differs from it, which bounds the request queue during
/// rapid zooming. Same-zoom siblings keep running; the cancellation rule is
/// zoom-based, not LIFO.
pub struct TiledSource {
    layer_id: i64,
    template: String,
    fetcher: Arc<dyn TileFetch>,
    cache: Cache<(u8, u32, u32), Arc<Vec<u8>>>,
    inflight: Arc<Mutex<HashMap<String, Inflight>>>,
    generation: AtomicU64,
    placeholder: Arc<Vec<u8>>,
    bus: EventBus,
    stats: Stats,
}

impl std::fmt::Debug for TiledSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiledSource")
            .field("layer_id", &self.layer_id)
            .field("template", &self.template)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl TiledSource {
    pub fn new(
        layer_id: i64,
        template: String,
        fetcher: Arc<dyn TileFetch>,
        cache_capacity: u64,
        tile_size: u32,
        bus: EventBus,
        stats: Stats,
    ) -> Self {
        TiledSource {
            layer_id,
            template,
            fetcher,
            cache: Cache::new(cache_capacity),
            inflight: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            placeholder: Arc::new(super::transparent_tile(tile_size)),
            bus,
            stats,
        }
    }

    /// Concrete request URL for one tile.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Number of requests currently in flight.
    pub fn pending_count(&self) -> usize {
        self.inflight.lock().unwrap().len()
    }

    /// Cached tile bytes, if this tile already completed.
    pub async fn cached(&self, z: u8, x: u32, y: u32) -> Option<Arc<Vec<u8>>> {
        let hit = self.cache.get(&(z, x, y)).await;
        if hit.is_some() {
            self.stats.record_cache_hit();
        }
        hit
    }

    /// Issue a tile fetch.
    ///
    /// A failed fetch resolves to the transparent placeholder; either way
    /// the tile completes with a `TileLoaded` event and its in-flight entry
    /// removed. Requests never surface errors to the caller.
    pub fn request_tile(&self, z: u8, x: u32, y: u32) {
        self.stats.record_requested();
        let key = format!("{}-{}-{}", z, x, y);
        let url = self.tile_url(z, x, y);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);

        let fetcher = self.fetcher.clone();
        let cache = self.cache.clone();
        let inflight = self.inflight.clone();
        let placeholder = self.placeholder.clone();
        let bus = self.bus.clone();
        let stats = self.stats.clone();
        let layer_id = self.layer_id;

        let mut pending = self.inflight.lock().unwrap();

        // stale-zoom sweep: abort everything captured at a different zoom
        let stale: Vec<String> = pending
            .iter()
            .filter(|(_, entry)| entry.zoom != z)
            .map(|(key, _)| key.clone())
            .collect();
        for stale_key in &stale {
            if let Some(entry) = pending.remove(stale_key) {
                entry.abort.abort();
            }
        }
        if !stale.is_empty() {
            self.stats.record_aborted(stale.len() as u64);
            tracing::debug!(layer_id, zoom = z, aborted = stale.len(), "stale tiles aborted");
        }

        // a re-request of the same tile supersedes the previous attempt
        if let Some(previous) = pending.remove(&key) {
            previous.abort.abort();
        }

        let task_key = key.clone();
        let task = tokio::spawn(async move {
            let bytes = match fetcher.fetch(&url).await {
                Ok(bytes) => {
                    stats.record_loaded();
                    Arc::new(bytes)
                }
                Err(err) => {
                    // partial tile failure must not abort the render pass
                    tracing::warn!(layer_id, key = %task_key, error = %err, "tile fetch failed");
                    stats.record_failed();
                    placeholder
                }
            };
            cache.insert((z, x, y), bytes).await;
            {
                let mut pending = inflight.lock().unwrap();
                if pending
                    .get(&task_key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    pending.remove(&task_key);
                }
            }
            bus.publish(MapEvent::TileLoaded { layer_id, z, x, y });
        });

        pending.insert(
            key,
            Inflight {
                zoom: z,
                generation,
                abort: task.abort_handle(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    /// Fetch that blocks until the test opens the gate.
    struct GatedFetch {
        release: watch::Receiver<bool>,
        fail: bool,
    }

    #[async_trait]
    impl TileFetch for GatedFetch {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, String> {
            let mut release = self.release.clone();
            while !*release.borrow() {
                release.changed().await.map_err(|e| e.to_string())?;
            }
            if self.fail {
                Err("gateway timeout".to_string())
            } else {
                Ok(vec![7])
            }
        }
    }

    fn make_source(fail: bool) -> (TiledSource, watch::Sender<bool>, EventBus) {
        let (tx, rx) = watch::channel(false);
        let bus = EventBus::default();
        let source = TiledSource::new(
            1,
            "https://gis/api/tile?resource=2&z={z}&x={x}&y={y}".to_string(),
            Arc::new(GatedFetch { release: rx, fail }),
            16,
            8,
            bus.clone(),
            Stats::default(),
        );
        (source, tx, bus)
    }

    async fn next_tile_loaded(
        rx: &mut tokio::sync::broadcast::Receiver<MapEvent>,
    ) -> Option<(u8, u32, u32)> {
        loop {
            match timeout(Duration::from_secs(1), rx.recv()).await {
                Ok(Ok(MapEvent::TileLoaded { z, x, y, .. })) => return Some((z, x, y)),
                Ok(Ok(_)) => continue,
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    #[test]
    fn tile_url_substitutes_coordinates() {
        let (source, _gate, _bus) = make_source(false);
        assert_eq!(
            source.tile_url(3, 4, 5),
            "https://gis/api/tile?resource=2&z=3&x=4&y=5"
        );
    }

    #[tokio::test]
    async fn stale_zoom_requests_are_aborted() {
        let (source, gate, bus) = make_source(false);
        let mut rx = bus.subscribe();

        source.request_tile(1, 0, 0);
        source.request_tile(2, 0, 0);
        source.request_tile(3, 0, 0);

        // z1 and z2 were captured at zooms that no longer match
        assert_eq!(source.pending_count(), 1);

        gate.send(true).unwrap();
        assert_eq!(next_tile_loaded(&mut rx).await, Some((3, 0, 0)));
        // no further completions fire for the aborted zoom levels
        assert_eq!(next_tile_loaded(&mut rx).await, None);
        assert_eq!(source.pending_count(), 0);
    }

    #[tokio::test]
    async fn same_zoom_siblings_are_not_cancelled() {
        let (source, gate, bus) = make_source(false);
        let mut rx = bus.subscribe();

        source.request_tile(5, 0, 0);
        source.request_tile(5, 1, 0);
        assert_eq!(source.pending_count(), 2);

        gate.send(true).unwrap();
        let mut loaded = vec![
            next_tile_loaded(&mut rx).await.unwrap(),
            next_tile_loaded(&mut rx).await.unwrap(),
        ];
        loaded.sort();
        assert_eq!(loaded, vec![(5, 0, 0), (5, 1, 0)]);
    }

    #[tokio::test]
    async fn failed_fetch_resolves_to_placeholder() {
        let (source, gate, bus) = make_source(true);
        let mut rx = bus.subscribe();

        source.request_tile(2, 1, 1);
        gate.send(true).unwrap();
        assert_eq!(next_tile_loaded(&mut rx).await, Some((2, 1, 1)));

        let bytes = source.cached(2, 1, 1).await.unwrap();
        assert_eq!(*bytes, super::super::transparent_tile(8));
        assert_eq!(source.pending_count(), 0);
    }

    #[tokio::test]
    async fn re_request_supersedes_previous_attempt() {
        let (source, gate, bus) = make_source(false);
        let mut rx = bus.subscribe();

        source.request_tile(4, 0, 0);
        source.request_tile(4, 0, 0);
        assert_eq!(source.pending_count(), 1);

        gate.send(true).unwrap();
        assert_eq!(next_tile_loaded(&mut rx).await, Some((4, 0, 0)));
        assert_eq!(next_tile_loaded(&mut rx).await, None);
    }

    #[tokio::test]
    async fn successful_tile_lands_in_cache() {
        let (source, gate, bus) = make_source(false);
        let mut rx = bus.subscribe();

        assert!(source.cached(6, 2, 3).await.is_none());
        source.request_tile(6, 2, 3);
        gate.send(true).unwrap();
        next_tile_loaded(&mut rx).await.unwrap();
        assert_eq!(*source.cached(6, 2, 3).await.unwrap(), vec![7]);
    }
}
