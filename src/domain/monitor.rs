use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Ciclo de vida de una tarea de monitorización.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Opening,
    Running,
    Failed,
    Stopped,
}

#[derive(Debug, Default)]
pub struct MonitorStats {
    frames_processed: AtomicU64,
    read_failures: AtomicU64,
    alerts_raised: AtomicU64,
    alerts_delivered: AtomicU64,
    duplicates_suppressed: AtomicU64,
    dispatch_failures: AtomicU64,
}

/// `alerts_raised` cuenta alertas entregadas al notificador; `alerts_delivered`
/// y `dispatch_failures` el resultado que confirmó (o no) el backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatsSnapshot {
    pub frames_processed: u64,
    pub read_failures: u64,
    pub alerts_raised: u64,
    pub alerts_delivered: u64,
    pub duplicates_suppressed: u64,
    pub dispatch_failures: u64,
}

impl MonitorStats {
    pub fn frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_failed(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn alert_raised(&self) {
        self.alerts_raised.fetch_add(1, Ordering::Relaxed);
    }

    pub fn alert_delivered(&self) {
        self.alerts_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplicate_suppressed(&self) {
        self.duplicates_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispatch_failed(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MonitorStatsSnapshot {
        MonitorStatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            alerts_delivered: self.alerts_delivered.load(Ordering::Relaxed),
            duplicates_suppressed: self.duplicates_suppressed.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
        }
    }
}

/// Estado compartido entre una tarea de monitorización y su supervisor.
#[derive(Debug)]
pub struct MonitorStatus {
    state: RwLock<MonitorState>,
    pub stats: MonitorStats,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            state: RwLock::new(MonitorState::Idle),
            stats: MonitorStats::default(),
        }
    }
}

impl MonitorStatus {
    pub fn state(&self) -> MonitorState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set_state(&self, next: MonitorState) {
        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

/// Resultado pendiente de una alerta ya entregada al notificador.
/// Se consume una sola vez, cuando el backend responde o falla.
#[derive(Debug)]
pub struct DeliveryReceipt {
    status: Arc<MonitorStatus>,
}

impl DeliveryReceipt {
    pub fn new(status: Arc<MonitorStatus>) -> Self {
        Self { status }
    }

    pub fn delivered(self) {
        self.status.stats.alert_delivered();
    }

    pub fn failed(self) {
        self.status.stats.dispatch_failed();
    }
}
