use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use image::RgbImage;
use video_rs::decode::Decoder;
use video_rs::{Location, Url};

use crate::application::ports::FrameReader;
use crate::domain::errors::{DomainError, DomainResult};

#[derive(Clone)]
pub enum MediaDescriptor {
    Stream(Url),
    File(PathBuf),
}

impl MediaDescriptor {
    /// Con esquema de URL es un flujo de red; el resto, rutas de fichero.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Url>() {
            Ok(url) if url.scheme().len() > 1 => MediaDescriptor::Stream(url),
            _ => MediaDescriptor::File(PathBuf::from(raw)),
        }
    }
}

impl fmt::Display for MediaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaDescriptor::File(path) => write!(f, "file: {}", path.display()),
            MediaDescriptor::Stream(url) => write!(f, "stream: {}", url),
        }
    }
}

impl From<MediaDescriptor> for Location {
    fn from(descriptor: MediaDescriptor) -> Self {
        match descriptor {
            MediaDescriptor::File(path) => Location::File(path),
            MediaDescriptor::Stream(url) => Location::Network(url),
        }
    }
}

/// Captura de cámaras IP (RTSP/HTTP) y ficheros mediante ffmpeg.
pub struct NetworkCapture {
    decoder: Decoder,
}

impl NetworkCapture {
    pub fn open(descriptor: MediaDescriptor) -> Result<Self> {
        video_rs::init().map_err(|e| anyhow!("no se pudo inicializar ffmpeg: {e}"))?;
        tracing::debug!(%descriptor, "abriendo fuente ffmpeg");
        let decoder = Decoder::new(descriptor)?;
        let (w, h) = decoder.size();
        tracing::info!("Fuente abierta: {}x{}", w, h);
        Ok(Self { decoder })
    }

    pub fn next_rgb(&mut self) -> Result<RgbImage> {
        let (_, frame) = self.decoder.decode()?;
        let (h, w, _) = frame.dim();
        let data: Vec<u8> = frame.iter().copied().collect();
        RgbImage::from_raw(w as u32, h as u32, data)
            .ok_or_else(|| anyhow!("frame {}x{} con tamaño inesperado", w, h))
    }
}

impl FrameReader for NetworkCapture {
    fn read(&mut self) -> DomainResult<RgbImage> {
        self.next_rgb()
            .map_err(|e| DomainError::ReadFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_and_paths_are_told_apart() {
        assert!(matches!(MediaDescriptor::parse("rtsp://10.0.0.5:554/live"), MediaDescriptor::Stream(_)));
        assert!(matches!(MediaDescriptor::parse("http://cam.local/video.mjpg"), MediaDescriptor::Stream(_)));
        assert!(matches!(MediaDescriptor::parse("/srv/barn/recording.mp4"), MediaDescriptor::File(_)));
        assert!(matches!(MediaDescriptor::parse("clips/test.mp4"), MediaDescriptor::File(_)));
    }
}
