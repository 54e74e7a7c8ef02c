pub mod adapters;
pub mod annotations;
pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod geometry;
pub mod layer;
pub mod map;
pub mod models;
pub mod panels;
pub mod plugins;
pub mod states;
pub mod toolbar;
pub mod tools;
pub mod traits;
pub mod utils;

pub use config::Config;
pub use display::{Display, DisplayOptions};
pub use error::{EngineError, Result};
pub use events::{AnnotationEvent, EventBus, MapEvent};
pub use models::tree::TreeNode;
pub use states::MapStates;
