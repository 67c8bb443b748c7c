use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use aztlan_api::NasaImage;
use log::warn;
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_QUERY: &str = "galaxy";

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
}

/// GET /api/nasa-feed?q=… — at most `nasa_feed_cap` images, `[]` on any
/// upstream failure.
pub async fn nasa_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Json<Vec<NasaImage>> {
    let q = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_QUERY);

    match state.nasa.search_images(q, state.settings.nasa_feed_cap).await {
        Ok(images) => Json(images),
        Err(e) => {
            warn!("nasa feed for {q:?} unavailable: {e}");
            Json(Vec::new())
        }
    }
}
