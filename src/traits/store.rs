use crate::models::annotation::AnnotationRecord;
use crate::models::geometry::GeometryExtent;
use async_trait::async_trait;

/// Feature CRUD boundary for annotation persistence.
///
/// Errors are plain strings here; the annotations manager wraps them into
/// [`crate::error::EngineError::Persistence`] after rolling back optimistic
/// state.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    async fn list(&self) -> Result<Vec<AnnotationRecord>, String>;
    /// Returns the id assigned by the backend.
    async fn create(&self, record: AnnotationRecord) -> Result<i64, String>;
    async fn update(&self, id: i64, record: AnnotationRecord) -> Result<(), String>;
    async fn delete(&self, id: i64) -> Result<(), String>;
    async fn extent(&self, id: i64) -> Result<GeometryExtent, String>;
}
