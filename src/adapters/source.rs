use crate::adapters::ffmpeg::network::{MediaDescriptor, NetworkCapture};
use crate::adapters::v4l2::capture::{CaptureConfig, V4l2Capture};
use crate::application::ports::{FrameReader, FrameSourcePort};
use crate::domain::camera::{CameraUrl, SourceKind};
use crate::domain::errors::{DomainError, DomainResult};

/// Abre la cámara según el tipo de URL: nodos V4L2 locales o flujos ffmpeg.
pub struct CameraSources {
    capture: CaptureConfig,
}

impl CameraSources {
    pub fn new(capture: CaptureConfig) -> Self {
        Self { capture }
    }
}

impl FrameSourcePort for CameraSources {
    fn open(&self, url: &CameraUrl) -> DomainResult<Box<dyn FrameReader>> {
        let reader: Box<dyn FrameReader> = match url.kind() {
            SourceKind::Device => Box::new(
                V4l2Capture::open(&url.device_path(), &self.capture)
                    .map_err(|e| DomainError::SourceUnavailable(format!("{url}: {e}")))?,
            ),
            SourceKind::Stream => Box::new(
                NetworkCapture::open(MediaDescriptor::parse(url.as_str()))
                    .map_err(|e| DomainError::SourceUnavailable(format!("{url}: {e}")))?,
            ),
        };
        Ok(reader)
    }
}
