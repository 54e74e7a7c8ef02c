use crate::models::layer::{LayerDescriptor, LayerKind};
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared tile-lifecycle counters, cloned into every adapter.
#[derive(Debug, Clone, Default)]
pub struct Stats {
    inner: Arc<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    tiles_requested: AtomicU64,
    tiles_loaded: AtomicU64,
    tiles_failed: AtomicU64,
    tiles_aborted: AtomicU64,
    cache_hits: AtomicU64,
    images_rendered: AtomicU64,
}

impl Stats {
    pub fn record_requested(&self) {
        self.inner.tiles_requested.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_loaded(&self) {
        self.inner.tiles_loaded.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_failed(&self) {
        self.inner.tiles_failed.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_aborted(&self, n: u64) {
        self.inner.tiles_aborted.fetch_add(n, Ordering::Relaxed);
    }
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_image(&self) {
        self.inner.images_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tiles_requested(&self) -> u64 {
        self.inner.tiles_requested.load(Ordering::Relaxed)
    }
    pub fn tiles_loaded(&self) -> u64 {
        self.inner.tiles_loaded.load(Ordering::Relaxed)
    }
    pub fn tiles_failed(&self) -> u64 {
        self.inner.tiles_failed.load(Ordering::Relaxed)
    }
    pub fn tiles_aborted(&self) -> u64 {
        self.inner.tiles_aborted.load(Ordering::Relaxed)
    }
    pub fn cache_hits(&self) -> u64 {
        self.inner.cache_hits.load(Ordering::Relaxed)
    }

    pub fn summary(&self) -> String {
        format!(
            "requested: {}, loaded: {}, failed: {}, aborted: {}, cache hits: {}",
            self.tiles_requested(),
            self.tiles_loaded(),
            self.tiles_failed(),
            self.tiles_aborted(),
            self.cache_hits()
        )
    }
}

/// Print a per-kind summary of the resolved layer set, as shown by the
/// `inspect` CLI command.
pub fn print_layer_summary(layers: &[LayerDescriptor]) {
    let mut kind_info: HashMap<LayerKind, (usize, usize, f64, f64)> = HashMap::new();
    for layer in layers {
        let entry = kind_info
            .entry(layer.kind)
            .or_insert((0, 0, layer.opacity, layer.opacity));
        entry.0 += 1;
        entry.1 += layer.visibility as usize;
        entry.2 = entry.2.min(layer.opacity);
        entry.3 = entry.3.max(layer.opacity);
    }

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Kind")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Layers")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Visible")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Opacity min")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Opacity max")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let mut kinds: Vec<_> = kind_info.into_iter().collect();
    kinds.sort_by_key(|(kind, _)| kind.to_string());
    for (kind, (count, visible, min_opacity, max_opacity)) in kinds {
        table.add_row(vec![
            Cell::new(kind.to_string()),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new(visible).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", min_opacity)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", max_opacity)).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\nLayer summary:\n{}", table);
}
