use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use webmap::layer::LayerSource;
use webmap::models::tree::TreeNode;
use webmap::utils::status::print_layer_summary;
use webmap::{Config, Display, DisplayOptions, MapEvent};

#[derive(Parser)]
#[command(name = "webmap", version, about = "Webmap engine inspection tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a webmap configuration and print the resolved layer set
    Inspect {
        /// Path to the webmap JSON (engine config + layer tree)
        config: PathBuf,
    },
    /// Fetch the visible tiles of one layer and report timing/statistics
    Smoke {
        config: PathBuf,
        /// Layer id to exercise
        #[arg(long)]
        layer: i64,
        /// Zoom level of the smoke viewport
        #[arg(long, default_value_t = 3)]
        zoom: u8,
    },
}

/// On-disk shape: engine configuration plus the layer tree root.
#[derive(serde::Deserialize)]
struct WebmapFile {
    #[serde(default)]
    config: Config,
    root: TreeNode,
}

fn load_file(path: &PathBuf) -> anyhow::Result<WebmapFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid webmap JSON in {}", path.display()))
}

fn inspect(file: WebmapFile) -> anyhow::Result<()> {
    let display = Display::new(file.config, file.root.clone(), DisplayOptions::default())?;

    let descriptors: Vec<_> = display
        .layers()
        .iter()
        .map(|layer| layer.descriptor().clone())
        .collect();
    println!("🗺️ {} layers resolved", descriptors.len());
    print_layer_summary(&descriptors);

    // flag plugin identities nothing can serve
    let registry = webmap::plugins::PluginRegistry::with_defaults();
    let known = registry.identities();
    let mut leaves = Vec::new();
    file.root.walk_layers(&mut leaves);
    let mut warnings = Vec::new();
    for leaf in &leaves {
        if let TreeNode::Layer {
            display_name,
            transparency,
            plugins,
            ..
        } = leaf
        {
            for identity in plugins.keys() {
                if !known.contains(&identity.as_str()) {
                    warnings.push(format!(
                        "⚠️ layer '{}' configures unknown plugin '{}'",
                        display_name, identity
                    ));
                }
            }
            if let Some(t) = transparency
                && !(0.0..=100.0).contains(t)
            {
                warnings.push(format!(
                    "⚠️ layer '{}' has out-of-range transparency {} (clamped)",
                    display_name, t
                ));
            }
        }
    }
    for warning in &warnings {
        println!("{}", warning);
    }

    println!("✅ configuration is valid");
    Ok(())
}

async fn smoke(file: WebmapFile, layer_id: i64, zoom: u8) -> anyhow::Result<()> {
    let api_base = file.config.api_base.clone();
    let display = Display::new(file.config, file.root, DisplayOptions::default())?;
    let layer = display
        .layer(layer_id)
        .with_context(|| format!("layer {} is not in the tree", layer_id))?
        .clone();

    display.set_view(0.0, 0.0, zoom);
    let view = display.view();
    let started = Instant::now();

    match layer.source() {
        LayerSource::Tiled(tiled) | LayerSource::Vector(tiled) => {
            let mut events = display.bus().subscribe();
            let tiles = view.visible_tiles();
            for &(z, x, y) in &tiles {
                tiled.request_tile(z, x, y);
            }
            println!("🚀 requested {} tiles from {}", tiles.len(), api_base);

            let mut completed = 0;
            while completed < tiles.len() {
                match timeout(Duration::from_secs(30), events.recv()).await {
                    Ok(Ok(MapEvent::TileLoaded { layer_id: id, .. })) if id == layer_id => {
                        completed += 1;
                    }
                    Ok(Ok(_)) => continue,
                    Ok(Err(err)) => anyhow::bail!("event bus closed: {}", err),
                    Err(_) => anyhow::bail!("timed out waiting for tile completions"),
                }
            }
        }
        LayerSource::Image(image) => {
            let (width, height) = view.size();
            let bytes = image.render(&view.view_extent(), width, height).await;
            println!("🚀 rendered one {}x{} image ({} bytes)", width, height, bytes.len());
        }
    }

    println!(
        "⏱️ finished in {:.2}s ({})",
        started.elapsed().as_secs_f64(),
        display.stats().summary()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_file_round_trips_a_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "config": {{"api_base": "https://gis.example.com/api"}},
                "root": {{"id": 1, "type": "group", "displayName": "Root", "children": [
                    {{"id": 2, "type": "layer", "displayName": "OSM", "layerId": 10,
                      "styleId": 11, "kind": "raster-tile"}}
                ]}}
            }}"#
        )
        .unwrap();

        let loaded = load_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(loaded.config.api_base, "https://gis.example.com/api");
        let mut leaves = Vec::new();
        loaded.root.walk_layers(&mut leaves);
        assert_eq!(leaves.len(), 1);
    }

    #[test]
    fn load_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_file(&file.path().to_path_buf()).is_err());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { config } => inspect(load_file(&config)?),
        Command::Smoke { config, layer, zoom } => smoke(load_file(&config)?, layer, zoom).await,
    }
}
