//! Error types for the conversion pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting a DSM/CLS pair.
///
/// Every variant is fatal to the conversion call that raised it; no
/// partial output survives a failure and nothing is retried.
#[derive(Error, Debug)]
pub enum EvalError {
    /// The input file, or the derived companion file, does not exist.
    #[error("cannot locate file {0:?}")]
    NotFound(PathBuf),

    /// The file exists but GDAL could not decode it as a raster.
    #[error("failed to open raster {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: gdal::errors::GdalError,
    },

    /// A registration offset was requested across differing coordinate
    /// reference systems. Both CRS strings are carried for diagnosis.
    #[error("image/offset projection mismatch\n  image projection:  {image}\n  offset projection: {offset}")]
    ProjectionMismatch { image: String, offset: String },

    /// No valid pixel to derive a quantization offset from.
    #[error("raster has no valid pixels, cannot derive elevation offset")]
    EmptyRaster,

    /// The elevation span does not fit the 16-bit encoding.
    #[error("elevation span of {span:.1} exceeds the encodable range [0, {max_code}]")]
    RangeOverflow { span: f64, max_code: u16 },

    /// GDAL reported a warp failure.
    #[error("reprojection failed: {0}")]
    Reprojection(String),

    /// A line of an XYZ file did not parse as three floats.
    #[error("malformed xyz record at line {line}")]
    MalformedXyz { line: usize },

    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, EvalError>;
