use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::application::ports::{DetectorPort, FrameSourcePort, NotifierPort};
use crate::domain::{
    alert::Alert,
    camera::CameraUrl,
    dedup::{DedupWindow, DetectionEvent, DetectionHistory},
    detection::Detection,
    monitor::{DeliveryReceipt, MonitorState, MonitorStatus},
};

pub type SharedDetector = Arc<Mutex<Box<dyn DetectorPort>>>;

/// Los fallos de lectura se registran en `warn` una vez cada tantos seguidos.
const READ_FAILURE_LOG_EVERY: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub read_retry_pause: Duration,
    pub frame_pause: Duration,
    pub dedup: DedupWindow,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            read_retry_pause: Duration::from_secs(1),
            frame_pause: Duration::from_secs(3),
            dedup: DedupWindow::default(),
        }
    }
}

/// Filtra, deduplica y notifica las detecciones de un frame.
/// Una vez cancelado el token no entrega ninguna alerta más.
pub struct AlertEngine {
    history: DetectionHistory,
    notifier: Arc<dyn NotifierPort>,
    status: Arc<MonitorStatus>,
    cancel: CancellationToken,
}

impl AlertEngine {
    pub fn new(
        window: DedupWindow,
        notifier: Arc<dyn NotifierPort>,
        status: Arc<MonitorStatus>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            history: DetectionHistory::new(window),
            notifier,
            status,
            cancel,
        }
    }

    pub fn history(&self) -> &DetectionHistory {
        &self.history
    }

    /// Devuelve las alertas aceptadas en este frame, en el orden del detector.
    pub fn process(&mut self, detections: &[Detection], now: Instant) -> Vec<Alert> {
        let mut accepted = Vec::new();

        for det in detections {
            if self.cancel.is_cancelled() {
                debug!("tarea cancelada; se descartan las detecciones restantes");
                break;
            }

            let label = det.kind();
            if !label.is_alertable() {
                continue;
            }

            let center = det.center();
            if self.history.is_duplicate(center, label, now) {
                debug!(%label, x = center.x, y = center.y, "detección duplicada descartada");
                self.status.stats.duplicate_suppressed();
                continue;
            }

            let alert = Alert::new(label, det.score, center);
            let receipt = DeliveryReceipt::new(self.status.clone());
            match self.notifier.notify(&alert.message(), receipt) {
                Ok(()) => {
                    self.status.stats.alert_raised();
                    info!(%label, confidence = det.score, tier = %alert.tier, "🚨 alerta emitida");
                }
                Err(e) => {
                    warn!("❌ Alerta descartada ({}): {}", label, e);
                    self.status.stats.dispatch_failed();
                }
            }

            self.history.record(DetectionEvent { center, label, observed_at: now });
            accepted.push(alert);
        }

        accepted
    }
}

/// Tarea de monitorización de una cámara: abre la fuente, lee frames,
/// ejecuta el detector y dispara alertas hasta que se cancela.
pub struct MonitorTask {
    url: CameraUrl,
    sources: Arc<dyn FrameSourcePort>,
    detector: SharedDetector,
    engine: AlertEngine,
    settings: MonitorSettings,
    status: Arc<MonitorStatus>,
    cancel: CancellationToken,
    runtime: Handle,
}

impl MonitorTask {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: CameraUrl,
        sources: Arc<dyn FrameSourcePort>,
        detector: SharedDetector,
        notifier: Arc<dyn NotifierPort>,
        settings: MonitorSettings,
        status: Arc<MonitorStatus>,
        cancel: CancellationToken,
        runtime: Handle,
    ) -> Self {
        let engine = AlertEngine::new(settings.dedup, notifier, status.clone(), cancel.clone());
        Self {
            url,
            sources,
            detector,
            engine,
            settings,
            status,
            cancel,
            runtime,
        }
    }

    pub fn spawn(self) -> std::io::Result<JoinHandle<MonitorState>> {
        std::thread::Builder::new()
            .name("barn-monitor".into())
            .spawn(move || self.run())
    }

    pub fn run(mut self) -> MonitorState {
        self.status.set_state(MonitorState::Opening);
        info!(url = %self.url, "📷 Abriendo cámara");

        let mut reader = match self.sources.open(&self.url) {
            Ok(reader) => reader,
            Err(e) => {
                error!(url = %self.url, "❌ Cámara no encontrada o no se pudo abrir: {}", e);
                self.status.set_state(MonitorState::Failed);
                return MonitorState::Failed;
            }
        };

        self.status.set_state(MonitorState::Running);
        info!(url = %self.url, "✅ Monitorización en marcha");

        let mut consecutive_failures: u64 = 0;
        while !self.cancel.is_cancelled() {
            let frame = match reader.read() {
                Ok(frame) => frame,
                Err(e) => {
                    self.status.stats.read_failed();
                    if consecutive_failures % READ_FAILURE_LOG_EVERY == 0 {
                        warn!(url = %self.url, failures = consecutive_failures + 1, "Error capturando frame: {}", e);
                    }
                    consecutive_failures += 1;
                    if self.pause(self.settings.read_retry_pause) {
                        break;
                    }
                    continue;
                }
            };
            consecutive_failures = 0;

            if self.cancel.is_cancelled() {
                break;
            }

            let detections = match self.detector.lock() {
                Ok(mut detector) => detector.detect(&frame),
                Err(poisoned) => poisoned.into_inner().detect(&frame),
            };
            // La inferencia puede tardar; una reconfiguración durante ella invalida el frame.
            if self.cancel.is_cancelled() {
                break;
            }
            self.engine.process(&detections, Instant::now());
            self.status.stats.frame_processed();

            if self.pause(self.settings.frame_pause) {
                break;
            }
        }

        info!(url = %self.url, "⏹️ Monitorización detenida");
        self.status.set_state(MonitorState::Stopped);
        MonitorState::Stopped
    }

    /// Duerme `duration` salvo cancelación; devuelve `true` si se canceló.
    fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return self.cancel.is_cancelled();
        }
        let cancel = self.cancel.clone();
        self.runtime.block_on(async move {
            tokio::select! {
                _ = cancel.cancelled() => true,
                _ = tokio::time::sleep(duration) => false,
            }
        })
    }
}
