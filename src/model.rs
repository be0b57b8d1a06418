use std::path::Path;

use gdal::Dataset;
use serde::Serialize;

use crate::error::{EvalError, Result};

/// Grid description of a georeferenced raster: size, band count,
/// projection and affine transform.
///
/// Two descriptors are equal iff every field compares equal, including
/// the six transform floats compared exactly. A transform that differs
/// only by floating-point noise therefore compares unequal, which is
/// what decides whether reprojection can be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub projection: String,
    /// GDAL order: [origin_x, pixel_width, row_skew_x, origin_y, col_skew_y, pixel_height].
    pub geo_transform: [f64; 6],
}

impl GridDescriptor {
    /// Read the descriptor from an already-open dataset. The caller
    /// retains ownership of the handle.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let (width, height) = dataset.raster_size();
        Ok(GridDescriptor {
            width,
            height,
            band_count: dataset.raster_count(),
            projection: dataset.projection(),
            geo_transform: dataset.geo_transform()?,
        })
    }

    /// Open the raster at `path`, read its descriptor and close it
    /// again before returning.
    pub fn from_path(path: &Path) -> Result<Self> {
        let dataset = open_raster(path)?;
        Self::from_dataset(&dataset)
    }

    pub fn origin_x(&self) -> f64 {
        self.geo_transform[0]
    }

    pub fn pixel_width(&self) -> f64 {
        self.geo_transform[1]
    }

    pub fn origin_y(&self) -> f64 {
        self.geo_transform[3]
    }

    /// Conventionally negative for north-up rasters.
    pub fn pixel_height(&self) -> f64 {
        self.geo_transform[5]
    }

    /// Names of the fields on which `self` and `other` disagree.
    pub fn differing_fields(&self, other: &GridDescriptor) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width != other.width {
            fields.push("width");
        }
        if self.height != other.height {
            fields.push("height");
        }
        if self.band_count != other.band_count {
            fields.push("band_count");
        }
        if self.projection != other.projection {
            fields.push("projection");
        }
        if self.geo_transform != other.geo_transform {
            fields.push("geo_transform");
        }
        fields
    }
}

/// Where to read a grid description from: a raster path, or a dataset
/// the caller already holds open.
#[derive(Clone, Copy)]
pub enum GridSource<'a> {
    Path(&'a Path),
    Dataset(&'a Dataset),
}

impl GridSource<'_> {
    pub fn descriptor(&self) -> Result<GridDescriptor> {
        match self {
            GridSource::Path(path) => GridDescriptor::from_path(path),
            GridSource::Dataset(dataset) => GridDescriptor::from_dataset(dataset),
        }
    }
}

/// Planar registration offset in the destination CRS units.
///
/// Only meaningful when source and destination share a CRS; alignment
/// rejects it otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistrationOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Metadata record written next to the converted images.
#[derive(Debug, Clone, Serialize)]
pub struct EvalMetadata {
    pub easting: f64,
    pub northing: f64,
    pub gsd: f64,
    pub zoffset: f64,
    pub zscale: f64,
    pub nodata: f64,
}

/// Open a raster for reading, mapping the two failure modes the
/// pipeline distinguishes: missing file vs. undecodable file.
pub fn open_raster(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(EvalError::NotFound(path.to_path_buf()));
    }
    Dataset::open(path).map_err(|source| EvalError::Open {
        path: path.to_path_buf(),
        source,
    })
}
