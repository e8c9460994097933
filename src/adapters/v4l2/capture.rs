use anyhow::{anyhow, bail, Result};
use image::{ImageFormat, Rgb, RgbImage};
use serde::Deserialize;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::application::ports::FrameReader;
use crate::domain::errors::{DomainError, DomainResult};

const MMAP_BUFFERS: u32 = 4;

/// Formato pedido a las cámaras V4L2 locales. El driver puede ajustarlo.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub fourcc: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fourcc: "MJPG".to_string(),
            width: 640,
            height: 480,
            fps: 15,
        }
    }
}

impl CaptureConfig {
    fn requested_fourcc(&self) -> Result<FourCC> {
        let code: [u8; 4] = self
            .fourcc
            .as_bytes()
            .try_into()
            .map_err(|_| anyhow!("FourCC '{}' debe tener 4 caracteres", self.fourcc))?;
        Ok(FourCC::new(&code))
    }
}

/// Codificación de los buffers que entrega el driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelLayout {
    Mjpeg,
    Yuyv,
}

impl PixelLayout {
    fn from_fourcc(fourcc: FourCC) -> Result<Self> {
        match &fourcc.repr {
            b"MJPG" => Ok(Self::Mjpeg),
            b"YUYV" => Ok(Self::Yuyv),
            _ => bail!("formato de cámara {} no soportado", fourcc),
        }
    }
}

/// Lector de frames de un nodo `/dev/videoN` por MMAP.
pub struct V4l2Capture {
    stream: Stream<'static>,
    layout: PixelLayout,
    width: u32,
    height: u32,
}

impl V4l2Capture {
    /// Negocia formato y FPS y arranca el stream. Un formato que el driver
    /// no sabe servir en MJPG/YUYV falla aquí y no en cada lectura.
    pub fn open(camera_path: &str, cfg: &CaptureConfig) -> Result<Self> {
        let dev = Device::with_path(camera_path)?;

        let mut wanted = dev.format()?;
        wanted.fourcc = cfg.requested_fourcc()?;
        wanted.width = cfg.width;
        wanted.height = cfg.height;
        let granted = dev.set_format(&wanted)?;
        let layout = PixelLayout::from_fourcc(granted.fourcc)?;

        let mut params = dev.params()?;
        params.interval.numerator = 1;
        params.interval.denominator = cfg.fps.max(1);
        if let Err(e) = dev.set_params(&params) {
            tracing::debug!("El driver ignoró los FPS pedidos: {}", e);
        }

        // El stream mapea buffers del dispositivo durante toda la vida del lector.
        let device: &'static Device = Box::leak(Box::new(dev));
        let stream = Stream::with_buffers(device, Type::VideoCapture, MMAP_BUFFERS)?;

        tracing::info!(
            "📷 {} abierta: {}x{} {} @ {} FPS",
            camera_path,
            granted.width,
            granted.height,
            granted.fourcc,
            cfg.fps
        );

        Ok(Self {
            stream,
            layout,
            width: granted.width,
            height: granted.height,
        })
    }

    pub fn next_rgb(&mut self) -> Result<RgbImage> {
        let (buf, _) = self.stream.next()?;
        match self.layout {
            PixelLayout::Mjpeg => Ok(image::load_from_memory_with_format(buf, ImageFormat::Jpeg)?.to_rgb8()),
            PixelLayout::Yuyv => yuyv_to_rgb(buf, self.width, self.height),
        }
    }
}

impl FrameReader for V4l2Capture {
    fn read(&mut self) -> DomainResult<RgbImage> {
        self.next_rgb()
            .map_err(|e| DomainError::ReadFailed(e.to_string()))
    }
}

fn bt601(y: u8, u: f32, v: f32) -> Rgb<u8> {
    let y = y as f32;
    let px = |c: f32| c.clamp(0.0, 255.0) as u8;
    Rgb([
        px(y + 1.402 * v),
        px(y - 0.344_136 * u - 0.714_136 * v),
        px(y + 1.772 * u),
    ])
}

/// YUYV 4:2:2: cada macropíxel `[Y0 U Y1 V]` son dos píxeles con el mismo croma.
fn yuyv_to_rgb(buf: &[u8], width: u32, height: u32) -> Result<RgbImage> {
    let needed = width as usize * height as usize * 2;
    if buf.len() < needed {
        bail!("buffer YUYV corto: {} bytes para {}x{}", buf.len(), width, height);
    }

    let mut out = RgbImage::new(width, height);
    {
        let mut pixels = out.pixels_mut().collect::<Vec<_>>();
        for (pair, macro_px) in pixels.chunks_mut(2).zip(buf[..needed].chunks_exact(4)) {
            let u = macro_px[1] as f32 - 128.0;
            let v = macro_px[3] as f32 - 128.0;
            *pair[0] = bt601(macro_px[0], u, v);
            if let Some(second) = pair.get_mut(1) {
                **second = bt601(macro_px[2], u, v);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_chroma_yields_grey_pixels() {
        let rgb = yuyv_to_rgb(&[100, 128, 200, 128], 2, 1).unwrap();
        assert_eq!(rgb.get_pixel(0, 0).0, [100, 100, 100]);
        assert_eq!(rgb.get_pixel(1, 0).0, [200, 200, 200]);
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(yuyv_to_rgb(&[100, 128], 2, 1).is_err());
    }

    #[test]
    fn only_mjpg_and_yuyv_are_decoded() {
        assert_eq!(PixelLayout::from_fourcc(FourCC::new(b"MJPG")).unwrap(), PixelLayout::Mjpeg);
        assert_eq!(PixelLayout::from_fourcc(FourCC::new(b"YUYV")).unwrap(), PixelLayout::Yuyv);
        assert!(PixelLayout::from_fourcc(FourCC::new(b"H264")).is_err());
    }

    #[test]
    fn fourcc_must_have_four_characters() {
        let cfg = CaptureConfig { fourcc: "MJPEG".into(), ..CaptureConfig::default() };
        assert!(cfg.requested_fourcc().is_err());
        assert_eq!(CaptureConfig::default().requested_fourcc().unwrap().repr, *b"MJPG");
    }
}
