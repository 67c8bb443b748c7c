mod aztlan;
mod ftc;
mod nasa;

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json, Router,
    http::{Method, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="es">
<head><meta charset="utf-8"><title>AZTLAN · FTC México</title></head>
<body>
  <h1>AZTLAN · FTC México</h1>
  <ul>
    <li><a href="/api/ftc-mexico-data">/api/ftc-mexico-data</a></li>
    <li><a href="/api/ftc-real">/api/ftc-real</a></li>
    <li><a href="/api/ftc-live-scrape">/api/ftc-live-scrape</a></li>
    <li><a href="/api/team-detail/28254">/api/team-detail/28254</a></li>
    <li><a href="/api/nasa-feed?q=galaxy">/api/nasa-feed?q=galaxy</a></li>
  </ul>
</body>
</html>
"#;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/ftc-mexico-data", get(ftc::ftc_mexico_data))
        .route("/api/ftc-real", get(ftc::ftc_real))
        .route("/api/ftc-live-scrape", get(ftc::ftc_live_scrape))
        .route("/api/team-detail/{team_key}", get(ftc::team_detail))
        .route("/api/nasa-rag", post(aztlan::nasa_rag))
        .route("/api/aztlan-predict", post(aztlan::aztlan_predict))
        .route("/api/aztlan-deep", post(aztlan::aztlan_deep))
        .route("/api/game-analysis", post(aztlan::game_analysis))
        .route("/api/nasa-feed", get(nasa::nasa_feed))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// A panicking handler still answers with an error-shaped 200.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".into());
    AppError::InternalError(detail).into_response()
}
