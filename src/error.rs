use thiserror::Error;

/// Engine-level error taxonomy.
///
/// Per-tile network failures never appear here: adapters absorb them and
/// resolve the affected tile to a placeholder instead, so one dead tile
/// cannot abort an otherwise-successful render pass.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Broken deployment: duplicate tool state, unknown layer kind, invalid
    /// layer tree. Fatal at construction time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A user-initiated request (load, save, delete) was rejected or the
    /// backend was unreachable.
    #[error("network error: {0}")]
    Network(String),

    /// Annotation create/update/delete rejected by the backend. The
    /// optimistic draft has already been rolled back when this is returned.
    #[error("annotation {op} failed: {reason}")]
    Persistence { op: &'static str, reason: String },
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
