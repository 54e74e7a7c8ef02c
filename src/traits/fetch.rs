use async_trait::async_trait;

/// Raw byte fetch for tile and image requests.
///
/// Production wiring uses the reqwest-backed [`crate::api::HttpTileFetch`];
/// tests substitute gated fakes to drive the cancellation paths
/// deterministically.
#[async_trait]
pub trait TileFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String>;
}
