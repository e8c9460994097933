use std::sync::Arc;
use crate::application::services::MonitorService;

/// Estado compartido para los manejadores HTTP de Axum.
/// Siguiendo la Arquitectura Hexagonal, el estado contiene los servicios (Casos de Uso).
#[derive(Clone)]
pub struct HttpState {
    /// Servicio que gestiona la cámara activa y su tarea de monitorización.
    pub monitor: Arc<MonitorService>,
}
