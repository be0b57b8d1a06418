//! Product writers: quantized-DSM and classification PNGs plus the
//! JSON metadata record.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Luma};

use crate::error::Result;
use crate::model::EvalMetadata;

/// Write a row-major u16 grid as a single-band 16-bit grayscale PNG.
pub fn write_png_u16(path: &Path, data: &[u16], width: usize, height: usize) -> Result<()> {
    debug_assert_eq!(data.len(), width * height);
    let img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(width as u32, height as u32, data.to_vec())
            .expect("pixel buffer length matches image dimensions");
    img.save(path)?;
    Ok(())
}

/// Write a row-major u8 grid as a single-band 8-bit grayscale PNG.
pub fn write_png_u8(path: &Path, data: &[u8], width: usize, height: usize) -> Result<()> {
    debug_assert_eq!(data.len(), width * height);
    let img: ImageBuffer<Luma<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width as u32, height as u32, data.to_vec())
            .expect("pixel buffer length matches image dimensions");
    img.save(path)?;
    Ok(())
}

/// Write the metadata record as JSON.
pub fn write_metadata(path: &Path, metadata: &EvalMetadata) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(file, metadata)?;
    Ok(())
}

/// Removes the files it tracks unless disarmed.
///
/// A conversion either produces all of its outputs or none: each
/// output path is tracked before the write that creates it, and the
/// guard is disarmed only once every output exists.
pub struct OutputGuard {
    paths: Vec<PathBuf>,
    armed: bool,
}

impl OutputGuard {
    pub fn new() -> Self {
        OutputGuard {
            paths: Vec::new(),
            armed: true,
        }
    }

    pub fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Default for OutputGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.armed {
            for path in &self.paths {
                let _ = fs::remove_file(path);
            }
        }
    }
}
