//! Image encoding for attachments.
//!
//! Attachments travel as self-describing `data:<mime>;base64,<payload>`
//! strings so that the draft snapshot, the preview, and the PDF writer can
//! all consume them without side information.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageCodecError {
    #[error("unsupported type '{0}': only image/* is accepted")]
    UnsupportedType(String),

    #[error("cannot decode image: {0}")]
    DecodeError(String),

    #[error("no drawing surface available: {0}")]
    RenderSurfaceUnavailable(String),
}

/// An encoded image as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    /// Wrap an existing data URL. The string is taken as is.
    pub fn from_data_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the data URL header, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let end = rest.find([';', ',']).unwrap_or(rest.len());
        Some(&rest[..end]).filter(|m| !m.is_empty())
    }

    /// The base64 payload after the first comma, or the whole string when
    /// there is no header.
    pub fn payload(&self) -> &str {
        match self.0.split_once(',') {
            Some((_, data)) if !data.is_empty() => data,
            _ => &self.0,
        }
    }

    pub fn decode_bytes(&self) -> Result<Vec<u8>, ImageCodecError> {
        STANDARD
            .decode(self.payload())
            .map_err(|e| ImageCodecError::DecodeError(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressOptions {
    pub max_width: u32,
    /// Lossy quality in `0.0..=1.0`.
    pub quality: f32,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: 1920,
            quality: 0.8,
        }
    }
}

/// Encode raw bytes as a data URL. Only `image/*` types are accepted.
pub fn encode(
    raw: &[u8],
    mime: &str,
) -> Result<EncodedImage, ImageCodecError> {
    if !mime.starts_with("image/") {
        return Err(ImageCodecError::UnsupportedType(mime.to_string()));
    }
    Ok(EncodedImage(format!(
        "data:{mime};base64,{}",
        STANDARD.encode(raw)
    )))
}

/// Target dimensions keeping the aspect ratio with `width <= max_width`.
pub fn scaled_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    (max_width, scaled as u32)
}

/// Decode, bound the width, and re-encode as JPEG.
pub fn compress(
    encoded: &EncodedImage,
    options: CompressOptions,
) -> Result<EncodedImage, ImageCodecError> {
    let bytes = encoded.decode_bytes()?;
    let img = image::load_from_memory(&bytes)
        .map_err(|e| ImageCodecError::DecodeError(e.to_string()))?;

    let (width, height) = scaled_dimensions(img.width(), img.height(), options.max_width);
    if width == 0 || height == 0 {
        return Err(ImageCodecError::RenderSurfaceUnavailable(format!(
            "cannot draw onto a {width}x{height} surface"
        )));
    }

    let resized = if (width, height) == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Triangle)
    };
    let rgb = resized.to_rgb8();

    let quality = (options.quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| ImageCodecError::RenderSurfaceUnavailable(e.to_string()))?;

    debug!(
        width,
        height,
        quality,
        before = bytes.len(),
        after = out.len(),
        "image recompressed"
    );
    encode(&out, "image/jpeg")
}

/// Encode and compress, falling back to the plain encoding when the image
/// cannot be recompressed.
pub fn prepare(
    raw: &[u8],
    mime: &str,
    options: CompressOptions,
) -> Result<EncodedImage, ImageCodecError> {
    let encoded = encode(raw, mime)?;
    match compress(&encoded, options) {
        Ok(compressed) => Ok(compressed),
        Err(err) => {
            warn!(error = %err, mime, "compression failed, keeping original encoding");
            Ok(encoded)
        }
    }
}

/// Approximate decoded size of a base64 payload.
pub fn estimate_byte_size(encoded: &EncodedImage) -> usize {
    let payload = encoded.payload();
    let padding = payload.bytes().filter(|b| *b == b'=').count();
    (payload.len() * 3 / 4).saturating_sub(padding)
}

pub fn format_human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{value} {}", UNITS[unit])
}

/// MIME type from a file extension, as a file picker would report it.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("tif" | "tiff") => "image/tiff",
        Some("ico") => "image/x-icon",
        Some("txt" | "md") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// MIME type from magic bytes, for payloads that carry no name.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        ImageFormat::Bmp => Some("image/bmp"),
        ImageFormat::Tiff => Some("image/tiff"),
        ImageFormat::Ico => Some("image/x-icon"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    // ── encode ───────────────────────────────────────────────────────────
    #[test]
    fn encode_rejects_non_images() {
        assert_eq!(
            encode(b"hello", "text/plain"),
            Err(ImageCodecError::UnsupportedType("text/plain".into()))
        );
    }

    #[test]
    fn encode_embeds_mime_and_payload() {
        let encoded = encode(b"abc", "image/png").unwrap();

        assert_eq!(encoded.as_str(), "data:image/png;base64,YWJj");
        assert_eq!(encoded.mime_type(), Some("image/png"));
        assert_eq!(encoded.payload(), "YWJj");
        assert_eq!(encoded.decode_bytes().unwrap(), b"abc");
    }

    #[test]
    fn payload_without_header_is_whole_string() {
        assert_eq!(EncodedImage::from_data_url("YWJj").payload(), "YWJj");
        assert_eq!(EncodedImage::from_data_url("YWJj").mime_type(), None);
    }

    // ── compress ─────────────────────────────────────────────────────────
    #[test]
    fn scaled_dimensions_round_height() {
        assert_eq!(scaled_dimensions(4000, 3000, 1920), (1920, 1440));
        assert_eq!(scaled_dimensions(3000, 1001, 1920), (1920, 641));
        assert_eq!(scaled_dimensions(800, 600, 1920), (800, 600));
    }

    #[test]
    fn compress_bounds_width_and_emits_jpeg() {
        let encoded = encode(&png(40, 20), "image/png").unwrap();
        let options = CompressOptions {
            max_width: 10,
            quality: 0.8,
        };

        let out = compress(&encoded, options).unwrap();
        assert_eq!(out.mime_type(), Some("image/jpeg"));

        let decoded = image::load_from_memory(&out.decode_bytes().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 5));
    }

    #[test]
    fn compress_garbage_is_decode_error() {
        let encoded = encode(b"not an image", "image/png").unwrap();

        assert!(matches!(
            compress(&encoded, CompressOptions::default()),
            Err(ImageCodecError::DecodeError(_))
        ));
    }

    #[test]
    fn compress_to_zero_height_has_no_surface() {
        let encoded = encode(&png(100, 1), "image/png").unwrap();
        let options = CompressOptions {
            max_width: 2,
            quality: 0.8,
        };

        assert!(matches!(
            compress(&encoded, options),
            Err(ImageCodecError::RenderSurfaceUnavailable(_))
        ));
    }

    #[test]
    fn prepare_falls_back_to_plain_encoding() {
        let out = prepare(b"broken", "image/heic", CompressOptions::default()).unwrap();

        assert_eq!(out, encode(b"broken", "image/heic").unwrap());
    }

    #[test]
    fn prepare_still_rejects_non_images() {
        assert!(matches!(
            prepare(b"x", "text/plain", CompressOptions::default()),
            Err(ImageCodecError::UnsupportedType(_))
        ));
    }

    // ── sizes ────────────────────────────────────────────────────────────
    #[test]
    fn estimate_subtracts_padding() {
        let two_pad = EncodedImage::from_data_url("data:image/png;base64,YWJjZA==");
        assert_eq!(estimate_byte_size(&two_pad), 8 * 3 / 4 - 2);

        let one_pad = EncodedImage::from_data_url("YWJjZGU=");
        assert_eq!(estimate_byte_size(&one_pad), 5);
    }

    #[test]
    fn human_sizes() {
        assert_eq!(format_human_size(0), "0 Bytes");
        assert_eq!(format_human_size(512), "512 Bytes");
        assert_eq!(format_human_size(1536), "1.5 KB");
        assert_eq!(format_human_size(1_048_576), "1 MB");
        assert_eq!(format_human_size(1_234_567), "1.18 MB");
        assert_eq!(format_human_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    // ── mime detection ───────────────────────────────────────────────────
    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_from_path(Path::new("a/roof.JPG")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_from_path(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn sniff_png_bytes() {
        assert_eq!(sniff_mime(&png(1, 1)), Some("image/png"));
        assert_eq!(sniff_mime(b"plain text"), None);
    }
}
