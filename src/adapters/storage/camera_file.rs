use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::ports::CameraStorePort;
use crate::domain::camera::CameraUrl;
use crate::domain::errors::{DomainError, DomainResult};

/// Persiste la URL de la cámara como texto plano.
pub struct CameraUrlFile {
    path: PathBuf,
}

impl CameraUrlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CameraStorePort for CameraUrlFile {
    async fn load(&self) -> DomainResult<Option<CameraUrl>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(CameraUrl::parse(Some(&contents)).ok()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Storage(format!("{}: {e}", self.path.display()))),
        }
    }

    async fn save(&self, url: &CameraUrl) -> DomainResult<()> {
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, url.as_str())
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("{}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("barn-sentry-{}-{}.txt", name, std::process::id()))
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = scratch("roundtrip");
        let store = CameraUrlFile::new(&path);

        store.save(&CameraUrl::parse(Some("rtsp://barn/cam")).unwrap()).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.unwrap().as_str(), "rtsp://barn/cam");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_or_blank_file_is_absent() {
        let path = scratch("blank");
        let store = CameraUrlFile::new(&path);
        assert!(store.load().await.unwrap().is_none());

        tokio::fs::write(&path, "  \n").await.unwrap();
        assert!(store.load().await.unwrap().is_none());

        tokio::fs::write(&path, "http://cam.local/feed\n").await.unwrap();
        assert_eq!(store.load().await.unwrap().unwrap().as_str(), "http://cam.local/feed");

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
