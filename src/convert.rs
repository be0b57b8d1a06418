//! The conversion pipeline: one DSM/CLS GeoTIFF pair in, two integer
//! PNG products and a JSON metadata record out.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::align::{align, AlignOptions};
use crate::error::{EvalError, Result};
use crate::model::{open_raster, EvalMetadata, GridDescriptor, GridSource};
use crate::quantize::quantize;
use crate::resample::resize_nearest;
use crate::writer::{self, OutputGuard};

/// Target ground sample distance of the evaluation products, in raster
/// length units per pixel.
pub const TARGET_GSD: f64 = 0.5;

/// Paths of the three files a successful conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertedProduct {
    pub dsm_image: PathBuf,
    pub cls_image: PathBuf,
    pub metadata: PathBuf,
}

/// Convert the DSM at `dsm_path` and its companion CLS raster into
/// evaluation products.
///
/// The companion path is derived by substituting `DSM` with `CLS` in
/// the file name. The CLS raster is aligned onto the DSM grid, both
/// are resampled to [`TARGET_GSD`] with nearest-neighbor interpolation
/// (category codes and the no-data sentinel must survive untouched),
/// the DSM is quantized to decimeter steps, and the three outputs are
/// written next to the inputs. Either all three outputs are written or
/// none remain.
pub fn convert_for_eval(dsm_path: &Path) -> Result<ConvertedProduct> {
    let cls_path = companion_cls_path(dsm_path)?;
    info!("converting {:?} with companion {:?}", dsm_path, cls_path);

    let dsm_dataset = open_raster(dsm_path)?;
    let grid = GridDescriptor::from_dataset(&dsm_dataset)?;
    let (no_data, dsm) = {
        let band = dsm_dataset.rasterband(1)?;
        let size = band.size();
        let pixels = band.read_as::<f32>((0, 0), size, size, None)?.data().to_vec();
        (band.no_data_value(), pixels)
    };

    // Co-registered pairs hit the no-reprojection fast path here.
    let cls = align(
        &cls_path,
        GridSource::Dataset(&dsm_dataset),
        &AlignOptions::default(),
    )?;
    drop(dsm_dataset);
    let cls: Vec<u8> = cls.data.iter().map(|&v| v as u8).collect();

    let target_width = (grid.width as f64 * grid.pixel_width() / TARGET_GSD) as usize;
    let target_height = (grid.height as f64 * grid.pixel_height().abs() / TARGET_GSD) as usize;
    info!(
        "resampling {}x{} -> {}x{} at {} units/pixel",
        grid.width, grid.height, target_width, target_height, TARGET_GSD
    );

    let dsm = resize_nearest(&dsm, grid.width, grid.height, target_width, target_height);
    let cls = resize_nearest(&cls, grid.width, grid.height, target_width, target_height);

    let quantized = quantize(&dsm, target_width, target_height, no_data)?;

    let metadata = EvalMetadata {
        easting: grid.origin_x(),
        northing: grid.origin_y(),
        gsd: TARGET_GSD,
        zoffset: quantized.z_offset,
        zscale: quantized.z_scale,
        nodata: quantized.no_data_code as f64,
    };

    let product = ConvertedProduct {
        dsm_image: dsm_path.with_extension("png"),
        cls_image: cls_path.with_extension("png"),
        metadata: dsm_path.with_extension("json"),
    };

    let mut guard = OutputGuard::new();
    guard.track(&product.dsm_image);
    writer::write_png_u16(&product.dsm_image, &quantized.codes, target_width, target_height)?;
    guard.track(&product.cls_image);
    writer::write_png_u8(&product.cls_image, &cls, target_width, target_height)?;
    guard.track(&product.metadata);
    writer::write_metadata(&product.metadata, &metadata)?;
    guard.disarm();

    info!(
        "written {:?}, {:?}, {:?}",
        product.dsm_image, product.cls_image, product.metadata
    );
    Ok(product)
}

/// Derive the classification companion path from the DSM path by the
/// fixed file-name substitution rule, requiring the file to exist.
fn companion_cls_path(dsm_path: &Path) -> Result<PathBuf> {
    let file_name = dsm_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| EvalError::NotFound(dsm_path.to_path_buf()))?;
    let cls_path = dsm_path.with_file_name(file_name.replace("DSM", "CLS"));
    if !cls_path.is_file() {
        return Err(EvalError::NotFound(cls_path));
    }
    Ok(cls_path)
}
