use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::IntoResponse,
};
use image::RgbImage;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::adapters::http::state::HttpState;
use crate::application::ports::FrameSourcePort;
use crate::domain::camera::CameraUrl;

pub const BOUNDARY: &str = "frame";

/// Vista en vivo para personas: re-abre la cámara por su cuenta y emite
/// JPEGs como `multipart/x-mixed-replace`. Sin detección.
pub async fn video_feed(State(st): State<HttpState>) -> impl IntoResponse {
    let (tx, rx) = mpsc::channel::<Result<Bytes, Infallible>>(4);

    if let Some(url) = st.monitor.camera_url().await {
        let sources = st.monitor.sources();
        let spawned = std::thread::Builder::new()
            .name("video-feed".into())
            .spawn(move || stream_frames(sources, url, tx));
        if let Err(e) = spawned {
            warn!("No se pudo lanzar el hilo del video feed: {}", e);
        }
    }

    (
        [(header::CONTENT_TYPE, format!("multipart/x-mixed-replace; boundary={BOUNDARY}"))],
        Body::from_stream(ReceiverStream::new(rx)),
    )
}

fn stream_frames(
    sources: Arc<dyn FrameSourcePort>,
    url: CameraUrl,
    tx: mpsc::Sender<Result<Bytes, Infallible>>,
) {
    let mut reader = match sources.open(&url) {
        Ok(reader) => reader,
        Err(e) => {
            warn!("Video feed: {}", e);
            return;
        }
    };

    loop {
        let frame = match reader.read() {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Video feed terminado: {}", e);
                break;
            }
        };
        let jpeg = match encode_jpeg(&frame) {
            Ok(jpeg) => jpeg,
            Err(e) => {
                warn!("Video feed: error codificando JPEG: {}", e);
                break;
            }
        };
        // El cliente cerró la conexión
        if tx.blocking_send(Ok(multipart_part(&jpeg))).is_err() {
            break;
        }
    }
}

pub fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 80);
    enc.encode(frame.as_raw(), frame.width(), frame.height(), image::ExtendedColorType::Rgb8)?;
    Ok(jpeg)
}

pub fn multipart_part(jpeg: &[u8]) -> Bytes {
    let mut part = Vec::with_capacity(jpeg.len() + 64);
    part.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Type: image/jpeg\r\n\r\n").as_bytes());
    part.extend_from_slice(jpeg);
    part.extend_from_slice(b"\r\n");
    Bytes::from(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_are_framed_with_the_boundary() {
        let part = multipart_part(b"JPEG");
        assert_eq!(&part[..], b"--frame\r\nContent-Type: image/jpeg\r\n\r\nJPEG\r\n");
    }

    #[test]
    fn frames_encode_as_jpeg() {
        let jpeg = encode_jpeg(&RgbImage::new(8, 8)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
