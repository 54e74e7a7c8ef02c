pub mod adapter;
pub mod fetch;
pub mod store;
pub mod tool;

pub use adapter::LayerAdapter;
pub use fetch::TileFetch;
pub use store::FeatureStore;
pub use tool::ToolControl;
