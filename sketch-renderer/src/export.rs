//! Canvas snapshot encoding.
//!
//! PNG snapshots are lossless and deterministic for a given pixel buffer;
//! they feed the host's surface material. JPEG snapshots are what the
//! description service receives.

use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

/// JPEG quality used for description requests.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Snapshot output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Opaque JPEG.
    Jpeg,
}

impl SnapshotFormat {
    /// MIME type of the encoded bytes.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Encode a pixmap as PNG.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode_png(pixmap: &Pixmap) -> RenderResult<Vec<u8>> {
    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}")))
}

/// Encode a pixmap as JPEG, flattening any transparency onto `background`.
///
/// # Errors
///
/// Returns an error if encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn encode_jpeg(pixmap: &Pixmap, background: [u8; 4], quality: u8) -> RenderResult<Vec<u8>> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        let alpha = f32::from(color.alpha()) / 255.0;
        let inv = 1.0 - alpha;
        for (channel, bg) in [color.red(), color.green(), color.blue()]
            .into_iter()
            .zip(background)
        {
            rgb_data.push(f32::from(channel).mul_add(alpha, f32::from(bg) * inv).round() as u8);
        }
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}

/// Encode a pixmap in the given format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn encode(
    pixmap: &Pixmap,
    format: SnapshotFormat,
    background: [u8; 4],
    jpeg_quality: u8,
) -> RenderResult<Vec<u8>> {
    match format {
        SnapshotFormat::Png => encode_png(pixmap),
        SnapshotFormat::Jpeg => encode_jpeg(pixmap, background, jpeg_quality),
    }
}
