//! PNG export for height maps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::storage::Array2D;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("Map of {0}x{1} cells does not fit a PNG")]
    TooLarge(usize, usize),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height mapped to black.
    pub min_height: f32,
    /// Height mapped to white.
    pub max_height: f32,
    pub compression: CompressionType,
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: 0.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

/// Exports a height map as a 16-bit grayscale PNG.
///
/// Heights are normalized from `[min_height, max_height]` to the full
/// `u16` range; values outside are clamped.
///
/// # Arguments
/// * `map` - Height map to export
/// * `path` - Output file path
/// * `options` - Height range and encoder settings
pub fn export_png(
    map: &Array2D<f32>,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;
    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let (width, height) = match (u32::try_from(map.width()), u32::try_from(map.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(PngExportError::TooLarge(map.width(), map.height())),
    };
    let range = max - min;

    let pixels: Vec<u16> = map
        .as_slice()
        .iter()
        .map(|&h| (((h - min) / range).clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();
    let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_raw(width, height, pixels)
        .ok_or(PngExportError::TooLarge(map.width(), map.height()))?;

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // The encoder takes raw bytes.
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());
    encoder.write_image(byte_slice, width, height, image::ExtendedColorType::L16)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient(width: usize, height: usize) -> Array2D<f32> {
        let mut map = Array2D::new(width, height);
        for y in 0..height {
            for x in 0..width {
                map.set(x, y, (x + y) as f32 / (width + height - 2) as f32);
            }
        }
        map
    }

    #[test]
    fn test_export_png() {
        let map = gradient(64, 32);
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.png");

        export_png(&map, &path, &PngExportOptions::default()).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), 64);
        assert_eq!(decoded.height(), 32);
        let luma = decoded.to_luma16();
        assert_eq!(luma.get_pixel(0, 0).0[0], 0);
        assert_eq!(luma.get_pixel(63, 31).0[0], 65535);
    }

    #[test]
    fn test_invalid_height_range() {
        let map = gradient(4, 4);
        let dir = tempdir().unwrap();
        let options = PngExportOptions {
            min_height: 1.0,
            max_height: -1.0,
            ..Default::default()
        };

        let result = export_png(&map, &dir.path().join("bad.png"), &options);
        assert!(matches!(result, Err(PngExportError::InvalidHeightRange(_, _))));
    }
}
