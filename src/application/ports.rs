use async_trait::async_trait;
use image::RgbImage;

use crate::domain::{
    camera::CameraUrl,
    detection::Detection,
    errors::DomainResult,
    monitor::DeliveryReceipt,
};

/// Detector preentrenado opaco. Los errores de inferencia son cosa del
/// adaptador: los registra y devuelve un frame vacío.
pub trait DetectorPort: Send {
    fn detect(&mut self, frame: &RgbImage) -> Vec<Detection>;
}

/// Fuente de vídeo bajo demanda. Si `open` falla, la tarea termina.
pub trait FrameSourcePort: Send + Sync {
    fn open(&self, url: &CameraUrl) -> DomainResult<Box<dyn FrameReader>>;
}

/// Los lectores viven en el hilo que los abrió; no necesitan ser `Send`.
pub trait FrameReader {
    fn read(&mut self) -> DomainResult<RgbImage>;
}

/// Envío best-effort al backend de la granja.
///
/// `Ok` solo indica que la alerta se entregó al notificador; el resultado real
/// se informa más tarde a través del `receipt`. Con `Err` el recibo se descarta
/// sin usar y quien llama cuenta el fallo.
pub trait NotifierPort: Send + Sync {
    fn notify(&self, message: &str, receipt: DeliveryReceipt) -> DomainResult<()>;
}

#[async_trait]
pub trait CameraStorePort: Send + Sync {
    async fn load(&self) -> DomainResult<Option<CameraUrl>>;
    async fn save(&self, url: &CameraUrl) -> DomainResult<()>;
}
