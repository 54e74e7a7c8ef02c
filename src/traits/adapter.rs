use crate::error::Result;
use crate::layer::LiveLayer;
use crate::models::layer::{LayerDescriptor, LayerKind};

/// Factory turning a declarative layer descriptor into a live map layer
/// with its data-fetch strategy attached.
///
/// `create_layer` is a pure function of the descriptor and the adapter's
/// injected dependencies; adapters keep no per-layer state of their own.
pub trait LayerAdapter: Send + Sync {
    fn kind(&self) -> LayerKind;
    fn create_layer(&self, descriptor: &LayerDescriptor) -> Result<LiveLayer>;
}
