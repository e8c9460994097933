use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// URL o ruta de la cámara del galpón. Nunca vacía.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CameraUrl(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Nodo V4L2 local: `/dev/videoN` o un índice suelto como `0`.
    Device,
    /// Cualquier cosa que abra ffmpeg (rtsp://, http:// o ficheros).
    Stream,
}

impl CameraUrl {
    pub fn parse(raw: Option<&str>) -> DomainResult<Self> {
        let url = raw.map(str::trim).unwrap_or_default();
        if url.is_empty() {
            return Err(DomainError::InvalidInput("camera_url vacío".into()));
        }
        Ok(Self(url.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> SourceKind {
        if self.0.starts_with("/dev/video") || self.0.parse::<u32>().is_ok() {
            SourceKind::Device
        } else {
            SourceKind::Stream
        }
    }

    /// Ruta del dispositivo V4L2; un índice suelto se traduce a `/dev/videoN`.
    pub fn device_path(&self) -> String {
        match self.0.parse::<u32>() {
            Ok(idx) => format!("/dev/video{}", idx),
            Err(_) => self.0.clone(),
        }
    }
}

impl fmt::Display for CameraUrl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_urls_are_rejected() {
        assert!(matches!(CameraUrl::parse(None), Err(DomainError::InvalidInput(_))));
        assert!(matches!(CameraUrl::parse(Some("   ")), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn urls_are_trimmed_and_classified() {
        let url = CameraUrl::parse(Some(" rtsp://10.0.0.7/stream1 \n")).unwrap();
        assert_eq!(url.as_str(), "rtsp://10.0.0.7/stream1");
        assert_eq!(url.kind(), SourceKind::Stream);

        let idx = CameraUrl::parse(Some("0")).unwrap();
        assert_eq!(idx.kind(), SourceKind::Device);
        assert_eq!(idx.device_path(), "/dev/video0");

        let dev = CameraUrl::parse(Some("/dev/video2")).unwrap();
        assert_eq!(dev.kind(), SourceKind::Device);
        assert_eq!(dev.device_path(), "/dev/video2");
    }
}
