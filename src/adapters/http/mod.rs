pub mod feed;
pub mod routes;
pub mod state;

use axum::{routing::{get, post}, Router};
use tower_http::cors::CorsLayer;
use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/start_monitoring", post(routes::start_monitoring))
        .route("/stop_monitoring", post(routes::stop_monitoring))
        .route("/status", get(routes::status))
        .route("/video_feed", get(feed::video_feed))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
