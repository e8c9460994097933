use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use ::config::{Config, ConfigError};

use crate::adapters::onnx::yolo_engine::YoloParams;
use crate::adapters::v4l2::capture::CaptureConfig;
use crate::application::monitor::MonitorSettings;
use crate::domain::dedup::DedupWindow;

pub const ENV_PREFIX: &str = "BARN_SENTRY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub detector: DetectorConfig,
    /// Solo para cámaras V4L2 locales.
    pub capture: CaptureConfig,
    pub dedup: DedupConfig,
    pub monitor: MonitorConfig,
    pub backend: BackendConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub model_path: String,
    /// Se descarga una vez al arrancar si `model_path` no existe.
    pub model_url: Option<String>,
    /// Nombres de clase en el orden de salida del modelo.
    pub labels: Vec<String>,
    pub input_size: u32,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub distance_px: f32,
    pub cooldown_secs: u64,
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub read_retry_pause_ms: u64,
    pub frame_pause_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: String,
    pub user_id: i64,
    pub barn_id: i64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub camera_url_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "models/best.onnx".to_string(),
            model_url: None,
            labels: vec!["dead".to_string(), "healthy".to_string(), "sick".to_string()],
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 100,
            intra_threads: 4,
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            distance_px: 50.0,
            cooldown_secs: 30,
            history_capacity: 50,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            read_retry_pause_ms: 1000,
            frame_pause_ms: 3000,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://farmsmanagement.runasp.net/api/Notifiactions/CreateNotification".to_string(),
            user_id: 24,
            barn_id: 3,
            timeout_secs: 10,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            camera_url_file: "camera_url.txt".to_string(),
        }
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "model {}, {}px, conf {}, iou {}, labels [{}]",
            self.model_path,
            self.input_size,
            self.conf_threshold,
            self.iou_threshold,
            self.labels.join(", ")
        )
    }
}

impl AppConfig {
    /// Valores por defecto, luego el YAML opcional y por último las variables
    /// `BARN_SENTRY_*` (claves anidadas con `__`, p. ej. `BARN_SENTRY_SERVER__PORT`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Message(msg.to_string())) };
        if self.dedup.history_capacity == 0 {
            return fail("dedup.history_capacity must be > 0");
        }
        if !(self.dedup.distance_px > 0.0) {
            return fail("dedup.distance_px must be > 0");
        }
        if !(0.0..=1.0).contains(&self.detector.conf_threshold) {
            return fail("detector.conf_threshold must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.detector.iou_threshold) {
            return fail("detector.iou_threshold must be within [0, 1]");
        }
        if self.detector.labels.is_empty() {
            return fail("detector.labels must not be empty");
        }
        if self.backend.endpoint.trim().is_empty() {
            return fail("backend.endpoint must not be empty");
        }
        Ok(())
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            read_retry_pause: Duration::from_millis(self.monitor.read_retry_pause_ms),
            frame_pause: Duration::from_millis(self.monitor.frame_pause_ms),
            dedup: DedupWindow {
                distance_px: self.dedup.distance_px,
                cooldown: Duration::from_secs(self.dedup.cooldown_secs),
                capacity: self.dedup.history_capacity,
            },
        }
    }

    pub fn yolo_params(&self) -> YoloParams {
        YoloParams {
            input_size: self.detector.input_size,
            conf_threshold: self.detector.conf_threshold,
            iou_threshold: self.detector.iou_threshold,
            max_detections: self.detector.max_detections,
        }
    }
}
