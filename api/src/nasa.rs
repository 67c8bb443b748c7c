//! NASA Image and Video Library search.
//! Endpoint: https://images-api.nasa.gov/search?q={query}&media_type=image

use crate::NasaImage;
use crate::client::{ApiResult, DEFAULT_TIMEOUT, http_client, send_json, url_with_params};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const NASA_BASE_URL: &str = "https://images-api.nasa.gov";

#[derive(Deserialize, Default, Debug)]
pub struct SearchResponse {
    #[serde(default)]
    pub collection: Collection,
}

#[derive(Deserialize, Default, Debug)]
pub struct Collection {
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Deserialize, Default, Debug)]
pub struct Item {
    #[serde(default)]
    pub data: Vec<ItemData>,
    #[serde(default)]
    pub links: Vec<ItemLink>,
}

#[derive(Deserialize, Default, Debug)]
pub struct ItemData {
    pub title: Option<String>,
    pub nasa_id: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
pub struct ItemLink {
    pub href: Option<String>,
    pub render: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NasaApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for NasaApi {
    fn default() -> Self {
        Self::new(NASA_BASE_URL, DEFAULT_TIMEOUT)
    }
}

impl NasaApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client("aztlan/0.2 (nasa feed)"),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
        }
    }

    /// Search the image library, returning at most `cap` images.
    pub async fn search_images(&self, query: &str, cap: usize) -> ApiResult<Vec<NasaImage>> {
        let url = url_with_params(
            &format!("{}/search", self.base_url),
            &[("q", query), ("media_type", "image")],
        )?;
        debug!("GET {url}");
        let label = url.to_string();
        let raw: SearchResponse = send_json(self.client.get(url).timeout(self.timeout), &label).await?;
        Ok(map_items(raw.collection.items, cap))
    }
}

/// Items without an image link are skipped; a missing title falls back to the
/// NASA id.
fn map_items(items: Vec<Item>, cap: usize) -> Vec<NasaImage> {
    items
        .into_iter()
        .filter_map(|item| {
            let url = item
                .links
                .into_iter()
                .find(|l| l.render.as_deref().is_none_or(|r| r == "image"))
                .and_then(|l| l.href)?;
            let data = item.data.into_iter().next().unwrap_or_default();
            let title = data.title.or(data.nasa_id).unwrap_or_default();
            Some(NasaImage { url, title })
        })
        .take(cap)
        .collect()
}
