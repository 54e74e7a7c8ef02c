use crate::models::geometry::GeometryExtent;
use crate::traits::TileFetch;
use crate::utils::query::set_url_param;
use async_trait::async_trait;

/// XYZ tile URL template for a style resource. `{z}`/`{x}`/`{y}` stay as
/// placeholders filled per request; `nd` pins the style generation so the
/// browser cache is busted when the style changes.
pub fn tile_url_template(api_base: &str, style_id: i64, nd: u64) -> String {
    format!(
        "{}/component/render/tile?resource={}&nd={}&z={{z}}&x={{x}}&y={{y}}",
        api_base, style_id, nd
    )
}

/// Single-image render request for one view extent.
///
/// The extent/size/resource parameters are rewritten into the backend's
/// expected form; `symbols[{resource}]` is attached only when a symbol
/// subset is requested.
pub fn image_url(
    api_base: &str,
    style_id: i64,
    extent: &GeometryExtent,
    width: u32,
    height: u32,
    symbols: Option<&[String]>,
) -> String {
    let mut url = format!(
        "{}/component/render/image?resource={}&extent={}&size={}x{}",
        api_base,
        style_id,
        extent.to_bbox_param(),
        width,
        height
    );
    if let Some(symbols) = symbols {
        url = set_url_param(
            &url,
            &format!("symbols[{}]", style_id),
            &symbols.join(","),
        );
    }
    url
}

/// reqwest-backed byte fetch shared by the tiled and image sources.
pub struct HttpTileFetch {
    client: reqwest::Client,
}

impl HttpTileFetch {
    pub fn new(client: reqwest::Client) -> Self {
        HttpTileFetch { client }
    }
}

impl Default for HttpTileFetch {
    fn default() -> Self {
        HttpTileFetch::new(reqwest::Client::new())
    }
}

#[async_trait]
impl TileFetch for HttpTileFetch {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("unexpected status {} for {}", response.status(), url));
        }
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}
