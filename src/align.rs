//! Alignment of a source raster onto a destination grid.
//!
//! The source is loaded into an in-memory copy, optionally gets a new
//! no-data sentinel and a planar registration offset, and is then
//! either returned as-is (when the grids already match exactly) or
//! warped onto the destination grid.

use std::path::Path;

use gdal::raster::Buffer;
use gdal::{Dataset, DriverManager};
use tracing::info;

use crate::error::{EvalError, Result};
use crate::model::{open_raster, GridDescriptor, GridSource, RegistrationOffset};
use crate::nodata::rewrite_sentinel;
use crate::resample::ResampleAlg;

/// Options for [`align`].
#[derive(Debug, Clone, Default)]
pub struct AlignOptions {
    /// Planar shift applied to the source origin before comparing
    /// grids. Requires matching CRSs.
    pub offset: Option<RegistrationOffset>,
    /// Warp interpolation when reprojection is needed.
    pub resample: ResampleAlg,
    /// Replace the source's no-data sentinel with this value first.
    pub fill_no_data: Option<f64>,
}

/// Primary band of an aligned raster.
#[derive(Debug, Clone)]
pub struct AlignedBand {
    pub grid: GridDescriptor,
    /// Row-major pixel values.
    pub data: Vec<f32>,
    pub no_data: Option<f64>,
}

/// Align the raster at `source_path` onto the grid described by `dest`.
///
/// When the source grid and the destination grid compare equal (exact,
/// field-by-field) the source pixels are returned without a resampling
/// pass. Anything else, including a transform differing only by
/// floating-point noise, goes through the warp.
pub fn align(source_path: &Path, dest: GridSource<'_>, options: &AlignOptions) -> Result<AlignedBand> {
    let dest_grid = dest.descriptor()?;

    // Work on an in-memory copy; the on-disk source is never mutated.
    let source = open_raster(source_path)?;
    let mut copy = copy_to_memory(&source)?;
    drop(source);

    let mut no_data = copy.rasterband(1)?.no_data_value();

    // Rename the no-data sentinel if the caller asked for one the
    // source does not already use, rewriting the pixels to match.
    if let Some(new_no_data) = options.fill_no_data {
        if no_data != Some(new_no_data) {
            let mut band = copy.rasterband(1)?;
            if let Some(old) = no_data {
                let size = band.size();
                let buffer = band.read_as::<f32>((0, 0), size, size, None)?;
                let mut pixels = buffer.data().to_vec();
                rewrite_sentinel(&mut pixels, old, new_no_data);
                let mut buffer = Buffer::new(size, pixels);
                band.write((0, 0), size, &mut buffer)?;
            }
            band.set_no_data_value(Some(new_no_data))?;
            no_data = Some(new_no_data);
        }
    }

    let mut src_grid = GridDescriptor::from_dataset(&copy)?;

    if let Some(offset) = options.offset {
        // The offset is defined in destination projection space and is
        // meaningless if the projections differ.
        if src_grid.projection != dest_grid.projection {
            return Err(EvalError::ProjectionMismatch {
                image: src_grid.projection,
                offset: dest_grid.projection,
            });
        }
        let mut transform = src_grid.geo_transform;
        transform[0] += offset.dx;
        transform[3] += offset.dy;
        copy.set_geo_transform(&transform)?;
        src_grid = GridDescriptor::from_dataset(&copy)?;
    }

    if src_grid == dest_grid {
        info!("grids match, no reprojection");
        let band = copy.rasterband(1)?;
        let size = band.size();
        let buffer = band.read_as::<f32>((0, 0), size, size, None)?;
        return Ok(AlignedBand {
            grid: src_grid,
            data: buffer.data().to_vec(),
            no_data,
        });
    }

    info!(
        "reprojecting (adjusting {})",
        src_grid.differing_fields(&dest_grid).join(", ")
    );

    // Destination-shaped dataset: source band count, f32 pixels to
    // avoid precision loss, band 1 pre-filled with the no-data value.
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut warped = driver.create_with_band_type::<f32, _>(
        "",
        dest_grid.width,
        dest_grid.height,
        src_grid.band_count,
    )?;
    warped.set_projection(&dest_grid.projection)?;
    warped.set_geo_transform(&dest_grid.geo_transform)?;
    if let Some(ndv) = no_data {
        let mut band = warped.rasterband(1)?;
        band.set_no_data_value(Some(ndv))?;
        band.fill(ndv, None)?;
    }

    reproject_into(&copy, &warped, options.resample)?;

    let band = warped.rasterband(1)?;
    let size = band.size();
    let buffer = band.read_as::<f32>((0, 0), size, size, None)?;
    Ok(AlignedBand {
        grid: dest_grid,
        data: buffer.data().to_vec(),
        no_data,
    })
}

/// Copy every band of `source` into an f32 MEM dataset, carrying the
/// transform, projection and band-1 no-data value along.
fn copy_to_memory(source: &Dataset) -> Result<Dataset> {
    let grid = GridDescriptor::from_dataset(source)?;
    let driver = DriverManager::get_driver_by_name("MEM")?;
    let mut copy =
        driver.create_with_band_type::<f32, _>("", grid.width, grid.height, grid.band_count)?;
    copy.set_projection(&grid.projection)?;
    copy.set_geo_transform(&grid.geo_transform)?;

    for band_index in 1..=grid.band_count {
        let src_band = source.rasterband(band_index)?;
        let size = src_band.size();
        let mut buffer = src_band.read_as::<f32>((0, 0), size, size, None)?;
        let mut dst_band = copy.rasterband(band_index)?;
        dst_band.write((0, 0), size, &mut buffer)?;
    }
    if let Some(ndv) = source.rasterband(1)?.no_data_value() {
        copy.rasterband(1)?.set_no_data_value(Some(ndv))?;
    }
    Ok(copy)
}

/// Warp `src` onto `dst`'s grid with the selected resampling
/// algorithm. Projections and transforms are taken from the datasets.
fn reproject_into(src: &Dataset, dst: &Dataset, alg: ResampleAlg) -> Result<()> {
    let rv = unsafe {
        gdal_sys::GDALReprojectImage(
            src.c_dataset(),
            std::ptr::null(),
            dst.c_dataset(),
            std::ptr::null(),
            alg.as_gdal(),
            0.0,
            0.0,
            None,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
        )
    };
    if rv != gdal_sys::CPLErr::CE_None {
        let msg = unsafe { std::ffi::CStr::from_ptr(gdal_sys::CPLGetLastErrorMsg()) }
            .to_string_lossy()
            .into_owned();
        return Err(EvalError::Reprojection(msg));
    }
    Ok(())
}
