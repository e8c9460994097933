use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    application::{
        monitor::{MonitorSettings, MonitorTask, SharedDetector},
        ports::{CameraStorePort, FrameSourcePort, NotifierPort},
    },
    domain::{
        camera::CameraUrl,
        errors::{DomainError, DomainResult},
        monitor::{MonitorState, MonitorStatsSnapshot, MonitorStatus},
    },
};

struct ActiveMonitor {
    cancel: CancellationToken,
    status: Arc<MonitorStatus>,
    thread: Option<JoinHandle<MonitorState>>,
}

impl ActiveMonitor {
    /// Avisa a la tarea y recoge su hilo en segundo plano.
    fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            tokio::task::spawn_blocking(move || match thread.join() {
                Ok(state) => info!(?state, "Tarea de monitorización anterior finalizada"),
                Err(_) => warn!("La tarea de monitorización anterior terminó con pánico"),
            });
        }
    }
}

#[derive(Default)]
struct Slot {
    url: Option<CameraUrl>,
    active: Option<ActiveMonitor>,
    /// Estado de la última tarea detenida, para que `status` conserve sus contadores.
    last: Option<Arc<MonitorStatus>>,
}

impl Slot {
    fn retire_active(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                self.last = Some(active.status.clone());
                active.shutdown();
                true
            }
            None => false,
        }
    }
}

/// Foto devuelta por la operación de estado.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorReport {
    pub camera_url: Option<CameraUrl>,
    pub state: MonitorState,
    pub stats: MonitorStatsSnapshot,
}

/// Servicio que gestiona la cámara activa y su tarea de monitorización.
/// Garantiza una única tarea activa: reconfigurar cancela la anterior.
pub struct MonitorService {
    sources: Arc<dyn FrameSourcePort>,
    detector: SharedDetector,
    notifier: Arc<dyn NotifierPort>,
    store: Arc<dyn CameraStorePort>,
    settings: MonitorSettings,
    runtime: Handle,
    slot: Mutex<Slot>,
}

impl MonitorService {
    pub fn new(
        sources: Arc<dyn FrameSourcePort>,
        detector: SharedDetector,
        notifier: Arc<dyn NotifierPort>,
        store: Arc<dyn CameraStorePort>,
        settings: MonitorSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            sources,
            detector,
            notifier,
            store,
            settings,
            runtime,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Valida y persiste la URL, y (re)arranca la monitorización.
    /// Una URL vacía se rechaza sin tocar el estado.
    pub async fn start_monitoring(&self, camera_url: Option<&str>) -> DomainResult<CameraUrl> {
        let url = CameraUrl::parse(camera_url)?;

        let mut slot = self.slot.lock().await;
        self.store.save(&url).await?;
        self.restart(&mut slot, url.clone())?;
        Ok(url)
    }

    /// Reanuda la monitorización con la URL persistida, si existe.
    pub async fn resume(&self) -> DomainResult<Option<CameraUrl>> {
        let Some(url) = self.store.load().await? else {
            info!("No hay cámara persistida; esperando configuración");
            return Ok(None);
        };

        let mut slot = self.slot.lock().await;
        info!(%url, "Reanudando cámara persistida");
        self.restart(&mut slot, url.clone())?;
        Ok(Some(url))
    }

    /// Cancela la tarea activa. La URL persistida se conserva.
    pub async fn stop(&self) -> bool {
        self.slot.lock().await.retire_active()
    }

    pub async fn status(&self) -> MonitorReport {
        let slot = self.slot.lock().await;
        let (state, stats) = match (&slot.active, &slot.last) {
            (Some(active), _) => (active.status.state(), active.status.stats.snapshot()),
            // Una tarea que falló al abrir sigue informando `failed` tras detenerla.
            (None, Some(last)) => {
                let state = match last.state() {
                    MonitorState::Failed => MonitorState::Failed,
                    _ => MonitorState::Stopped,
                };
                (state, last.stats.snapshot())
            }
            (None, None) if slot.url.is_some() => (MonitorState::Stopped, MonitorStatsSnapshot::default()),
            (None, None) => (MonitorState::Idle, MonitorStatsSnapshot::default()),
        };
        MonitorReport {
            camera_url: slot.url.clone(),
            state,
            stats,
        }
    }

    pub async fn camera_url(&self) -> Option<CameraUrl> {
        self.slot.lock().await.url.clone()
    }

    pub fn sources(&self) -> Arc<dyn FrameSourcePort> {
        self.sources.clone()
    }

    fn restart(&self, slot: &mut Slot, url: CameraUrl) -> DomainResult<()> {
        if slot.retire_active() {
            info!("Cancelando la tarea de monitorización anterior");
        }

        let cancel = CancellationToken::new();
        let status = Arc::new(MonitorStatus::default());
        let task = MonitorTask::new(
            url.clone(),
            self.sources.clone(),
            self.detector.clone(),
            self.notifier.clone(),
            self.settings,
            status.clone(),
            cancel.clone(),
            self.runtime.clone(),
        );
        let thread = task
            .spawn()
            .map_err(|e| DomainError::OperationFailed(format!("no se pudo lanzar el hilo de monitorización: {e}")))?;

        slot.url = Some(url);
        slot.last = None;
        slot.active = Some(ActiveMonitor {
            cancel,
            status,
            thread: Some(thread),
        });
        Ok(())
    }
}

impl Drop for MonitorService {
    fn drop(&mut self) {
        if let Some(active) = self.slot.get_mut().active.as_ref() {
            active.cancel.cancel();
        }
    }
}
