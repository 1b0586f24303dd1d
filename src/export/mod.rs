//! Writers for height maps: 16-bit PNG for viewing and RAW for engines.

mod png;
mod raw;

pub use png::{export_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_raw, RawExportError, RawFormat};
