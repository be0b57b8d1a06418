//! Resampling: warp algorithm selection and the plain 2-D array resize
//! used when retiling to the target ground sample distance.

/// Resampling algorithm for the reprojection step, mapped 1-to-1 onto
/// GDAL's `GDALResampleAlg` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleAlg {
    /// Nearest neighbour, picks the closest pixel value.
    NearestNeighbour,
    /// Bilinear interpolation over a 2x2 kernel.
    Bilinear,
    /// Cubic convolution over a 4x4 kernel.
    Cubic,
    /// Cubic B-spline over a 4x4 kernel.
    CubicSpline,
    /// Lanczos windowed sinc over a 6x6 kernel.
    Lanczos,
    /// Weighted average of contributing non-nodata pixels.
    Average,
}

impl ResampleAlg {
    /// Corresponding `GDALResampleAlg` constant.
    pub fn as_gdal(&self) -> gdal_sys::GDALResampleAlg::Type {
        use gdal_sys::GDALResampleAlg::*;
        match self {
            ResampleAlg::NearestNeighbour => GRA_NearestNeighbour,
            ResampleAlg::Bilinear => GRA_Bilinear,
            ResampleAlg::Cubic => GRA_Cubic,
            ResampleAlg::CubicSpline => GRA_CubicSpline,
            ResampleAlg::Lanczos => GRA_Lanczos,
            ResampleAlg::Average => GRA_Average,
        }
    }
}

impl Default for ResampleAlg {
    fn default() -> Self {
        ResampleAlg::Bilinear
    }
}

/// Nearest-neighbor resize of a row-major 2-D grid to an explicit
/// target size.
///
/// Each destination pixel takes the value of exactly one source pixel
/// (pixel-area mapping, `sx = floor(dx * src/dst)`), so category codes
/// and no-data sentinels survive bit-identical. No value is ever
/// interpolated.
pub fn resize_nearest<T: Copy>(
    data: &[T],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<T> {
    debug_assert_eq!(data.len(), src_width * src_height);

    if dst_width == 0 || dst_height == 0 {
        return Vec::new();
    }

    let scale_x = src_width as f64 / dst_width as f64;
    let scale_y = src_height as f64 / dst_height as f64;

    let mut output = Vec::with_capacity(dst_width * dst_height);
    for dy in 0..dst_height {
        let sy = ((dy as f64 * scale_y) as usize).min(src_height - 1);
        for dx in 0..dst_width {
            let sx = ((dx as f64 * scale_x) as usize).min(src_width - 1);
            output.push(data[sy * src_width + sx]);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_resize_is_a_copy() {
        let data: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = resize_nearest(&data, 3, 2, 3, 2);
        assert_eq!(out, data);
    }

    #[test]
    fn test_halving_picks_even_rows_and_columns() {
        let data: Vec<f32> = vec![
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0, //
            13.0, 14.0, 15.0, 16.0,
        ];
        let out = resize_nearest(&data, 4, 4, 2, 2);
        assert_eq!(out, vec![1.0, 3.0, 9.0, 11.0]);
    }

    #[test]
    fn test_upsample_repeats_source_pixels() {
        let data: Vec<u8> = vec![1, 2, 3, 4];
        let out = resize_nearest(&data, 2, 2, 4, 4);
        assert_eq!(
            out,
            vec![
                1, 1, 2, 2, //
                1, 1, 2, 2, //
                3, 3, 4, 4, //
                3, 3, 4, 4,
            ]
        );
    }

    #[test]
    fn test_sentinel_values_survive_exactly() {
        // Nearest-neighbor never blends, so a no-data sentinel can only
        // appear where the source had one.
        let data: Vec<f32> = vec![
            -9999.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0, //
            13.0, 14.0, 15.0, 16.0,
        ];
        let out = resize_nearest(&data, 4, 4, 2, 2);
        assert_eq!(out[0], -9999.0);
        assert!(out[1..].iter().all(|v| *v != -9999.0));
    }

    #[test]
    fn test_empty_target() {
        let data: Vec<u8> = vec![1, 2, 3, 4];
        assert!(resize_nearest(&data, 2, 2, 0, 3).is_empty());
    }
}
