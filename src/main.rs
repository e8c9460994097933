use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use barn_sentry::application::monitor::SharedDetector;
use barn_sentry::application::ports::DetectorPort;
use barn_sentry::application::services::MonitorService;
use barn_sentry::adapters::{
    http::{router, state::HttpState},
    notify::backend::BackendNotifier,
    onnx::{model_bootstrap::ensure_model, yolo_engine::OnnxYoloEngine},
    source::CameraSources,
    storage::camera_file::CameraUrlFile,
};
use barn_sentry::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    barn_sentry::logging::init_logging();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("configuración inválida ({})", config_path.display()))?;
    tracing::info!("🔧 Detector: {}", config.detector);

    // 1. Modelo (descarga única si falta)
    let model_path = ensure_model(&config.detector.model_path, config.detector.model_url.as_deref()).await?;
    let engine = OnnxYoloEngine::load(
        &model_path.to_string_lossy(),
        config.detector.labels.clone(),
        config.yolo_params(),
        config.detector.intra_threads,
    )
    .context("no se pudo cargar el modelo YOLO")?;
    let detector: SharedDetector = Arc::new(Mutex::new(Box::new(engine) as Box<dyn DetectorPort>));

    // 2. Adaptadores de infraestructura
    let runtime = tokio::runtime::Handle::current();
    let sources = Arc::new(CameraSources::new(config.capture.clone()));
    let notifier = Arc::new(BackendNotifier::new(
        config.backend.endpoint.clone(),
        config.backend.user_id,
        config.backend.barn_id,
        config.backend.timeout_secs,
        runtime.clone(),
    ));
    let store = Arc::new(CameraUrlFile::new(&config.storage.camera_url_file));

    // 3. Servicio de monitorización; reanuda la cámara persistida si existe
    let monitor = Arc::new(MonitorService::new(
        sources,
        detector,
        notifier,
        store,
        config.monitor_settings(),
        runtime,
    ));
    if let Err(e) = monitor.resume().await {
        tracing::warn!("No se pudo reanudar la cámara persistida: {}", e);
    }

    // 4. Servidor HTTP
    let app = router(HttpState { monitor: monitor.clone() });
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("🚀 Chicken monitor escuchando en http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    monitor.stop().await;
    tracing::info!("👋 Servidor detenido");
    Ok(())
}
