//! Turn stored images into PDF-ready pixel data.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::imageops::FilterType;
use report_core::EncodedImage;

use crate::error::PdfError;

/// Largest edge, in pixels, kept for a 150pt cell (about 216 dpi).
pub const MAX_EDGE: u32 = 450;

/// Square RGB raster, zlib-compressed for a `FlateDecode` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub edge: u32,
    pub deflated: Vec<u8>,
}

/// Decode `image`, crop it to a centered square (cover fit) and downscale.
pub fn rasterize(image: &EncodedImage) -> Result<Raster, PdfError> {
    let bytes = image
        .decode_bytes()
        .map_err(|e| PdfError::ImageError(e.to_string()))?;
    let decoded =
        image::load_from_memory(&bytes).map_err(|e| PdfError::ImageError(e.to_string()))?;

    let (width, height) = (decoded.width(), decoded.height());
    if width == 0 || height == 0 {
        return Err(PdfError::ImageError("image has no pixels".to_string()));
    }

    let side = width.min(height);
    let square = decoded.crop_imm((width - side) / 2, (height - side) / 2, side, side);
    let edge = side.min(MAX_EDGE);
    let square = if edge < side {
        square.resize_exact(edge, edge, FilterType::Triangle)
    } else {
        square
    };
    let rgb = square.to_rgb8();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .map_err(|e| PdfError::ImageError(e.to_string()))?;
    let deflated = encoder
        .finish()
        .map_err(|e| PdfError::ImageError(e.to_string()))?;

    Ok(Raster { edge, deflated })
}
