use crate::models::annotation::AnnotationRecord;
use crate::models::geometry::GeometryExtent;
use crate::traits::FeatureStore;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Deserialize)]
struct CreateResponse {
    id: i64,
}

#[derive(Deserialize)]
struct ExtentResponse {
    extent: GeometryExtent,
}

/// Feature CRUD against the backend's annotation collection.
pub struct HttpFeatureStore {
    client: reqwest::Client,
    api_base: String,
    resource_id: i64,
}

impl HttpFeatureStore {
    pub fn new(client: reqwest::Client, api_base: impl Into<String>, resource_id: i64) -> Self {
        HttpFeatureStore {
            client,
            api_base: api_base.into(),
            resource_id,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/resource/{}/feature/", self.api_base, self.resource_id)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/resource/{}/feature/{}", self.api_base, self.resource_id, id)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(format!("unexpected status {}", response.status()))
    }
}

#[async_trait]
impl FeatureStore for HttpFeatureStore {
    async fn list(&self) -> Result<Vec<AnnotationRecord>, String> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| e.to_string())?;
        check_status(response)
            .await?
            .json::<Vec<AnnotationRecord>>()
            .await
            .map_err(|e| e.to_string())
    }

    async fn create(&self, record: AnnotationRecord) -> Result<i64, String> {
        let response = self
            .client
            .post(self.collection_url())
            .json(&record)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let created: CreateResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| e.to_string())?;
        Ok(created.id)
    }

    async fn update(&self, id: i64, record: AnnotationRecord) -> Result<(), String> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(&record)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        check_status(response).await.map(|_| ())
    }

    async fn delete(&self, id: i64) -> Result<(), String> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        check_status(response).await.map(|_| ())
    }

    async fn extent(&self, id: i64) -> Result<GeometryExtent, String> {
        let url = format!("{}/feature/{}/extent", self.api_base, id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        let extent: ExtentResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| e.to_string())?;
        Ok(extent.extent)
    }
}
