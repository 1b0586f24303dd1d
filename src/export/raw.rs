//! RAW height map export for game engine compatibility.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::Array2D;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// RAW sample layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (Unity default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian. Heights are written unscaled.
    R32Float,
}

/// Exports a height map as headerless RAW samples in row-major order.
///
/// R16 formats normalize `[min_height, max_height]` to the `u16` range.
///
/// # Arguments
/// * `map` - Height map to write
/// * `path` - Output file path
/// * `format` - Sample layout
/// * `min_height` - Height mapped to 0 (ignored for R32)
/// * `max_height` - Height mapped to 65535 (ignored for R32)
pub fn export_raw(
    map: &Array2D<f32>,
    path: &Path,
    format: RawFormat,
    min_height: f32,
    max_height: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_height >= max_height {
        return Err(RawExportError::InvalidHeightRange(min_height, max_height));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let range = max_height - min_height;
    let to_u16 = |h: f32| (((h - min_height) / range).clamp(0.0, 1.0) * 65535.0) as u16;

    for &height in map.as_slice() {
        match format {
            RawFormat::R16LittleEndian => writer.write_all(&to_u16(height).to_le_bytes())?,
            RawFormat::R16BigEndian => writer.write_all(&to_u16(height).to_be_bytes())?,
            RawFormat::R32Float => writer.write_all(&height.to_le_bytes())?,
        }
    }

    writer.flush()?;
    Ok(())
}

/// Returns the expected file size for a RAW export of `width × height` cells.
pub fn expected_file_size(width: usize, height: usize, format: RawFormat) -> u64 {
    let cells = (width as u64) * (height as u64);
    match format {
        RawFormat::R16LittleEndian | RawFormat::R16BigEndian => cells * 2,
        RawFormat::R32Float => cells * 4,
    }
}

impl RawFormat {
    /// File extension conventionally used for the format.
    pub fn extension(self) -> &'static str {
        match self {
            RawFormat::R16LittleEndian | RawFormat::R16BigEndian => "r16",
            RawFormat::R32Float => "r32",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(width: usize, height: usize) -> Array2D<f32> {
        let n = width * height;
        let data = (0..n).map(|i| i as f32 / (n - 1) as f32).collect();
        Array2D::from_vec(width, height, data).unwrap()
    }

    #[test]
    fn test_export_raw_r16() {
        let map = ramp(16, 8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.r16");

        export_raw(&map, &path, RawFormat::R16LittleEndian, 0.0, 1.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len() as u64, expected_file_size(16, 8, RawFormat::R16LittleEndian));
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 0);
        let last = bytes.len() - 2;
        assert_eq!(u16::from_le_bytes([bytes[last], bytes[last + 1]]), 65535);
    }

    #[test]
    fn test_export_raw_big_endian() {
        let map = Array2D::filled(2, 1, 1.0f32);
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.r16");

        export_raw(&map, &path, RawFormat::R16BigEndian, 0.0, 2.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), 32767);
    }

    #[test]
    fn test_export_raw_r32_is_unscaled() {
        let map = Array2D::from_vec(2, 1, vec![-3.5f32, 7.25]).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("height.r32");

        export_raw(&map, &path, RawFormat::R32Float, 0.0, 0.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len() as u64, expected_file_size(2, 1, RawFormat::R32Float));
        assert_eq!(f32::from_le_bytes(bytes[4..8].try_into().unwrap()), 7.25);
    }

    #[test]
    fn test_invalid_range_for_r16() {
        let map = ramp(4, 4);
        let dir = tempdir().unwrap();
        let result = export_raw(&map, &dir.path().join("x.r16"), RawFormat::R16LittleEndian, 1.0, 1.0);
        assert!(matches!(result, Err(RawExportError::InvalidHeightRange(_, _))));
    }

    #[test]
    fn test_expected_file_size() {
        assert_eq!(expected_file_size(256, 128, RawFormat::R16BigEndian), 256 * 128 * 2);
        assert_eq!(expected_file_size(256, 128, RawFormat::R32Float), 256 * 128 * 4);
    }
}
