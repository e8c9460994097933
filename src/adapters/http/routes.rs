use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{error, info};

use crate::adapters::http::state::HttpState;
use crate::application::dto::{ApiResponse, StartMonitoringRequest, StatusResponse};
use crate::domain::errors::DomainError;

pub async fn index() -> &'static str {
    "🐔 Chicken Monitor is running"
}

pub async fn start_monitoring(
    State(st): State<HttpState>,
    payload: Option<Json<StartMonitoringRequest>>,
) -> impl IntoResponse {
    let req = payload.map(|Json(r)| r).unwrap_or_default();

    match st.monitor.start_monitoring(req.camera_url.as_deref()).await {
        Ok(url) => {
            info!(%url, "📷 Cámara configurada");
            (StatusCode::OK, Json(ApiResponse::ok(format!("✅ Started monitoring camera: {url}"))))
        }
        Err(DomainError::InvalidInput(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("❌ Send the camera URL (camera_url)")),
        ),
        Err(e) => {
            error!("No se pudo iniciar la monitorización: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e.to_string())))
        }
    }
}

pub async fn stop_monitoring(State(st): State<HttpState>) -> impl IntoResponse {
    if st.monitor.stop().await {
        Json(ApiResponse::ok("⏹️ Monitoring stopped"))
    } else {
        Json(ApiResponse::ok("No monitoring task was running"))
    }
}

pub async fn status(State(st): State<HttpState>) -> impl IntoResponse {
    Json(StatusResponse::from(st.monitor.status().await))
}
