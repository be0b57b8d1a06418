//! Fixed-point encoding of elevation surfaces.
//!
//! A DSM is stored as unsigned 16-bit decimeter steps above the
//! raster's own minimum valid elevation. The encoding is inverted with
//! `value = code * z_scale + z_offset` for every code other than the
//! no-data sentinel.

use crate::error::{EvalError, Result};

/// Elevation step of one code unit, in raster length units. Decimeter
/// resolution is a domain policy, not derived from the data range.
pub const Z_SCALE: f64 = 0.1;

/// Code reserved for pixels with no measurement.
pub const NO_DATA_CODE: u16 = u16::MAX;

/// Largest code available to valid elevations.
pub const MAX_VALID_CODE: u16 = u16::MAX - 1;

/// A quantized elevation raster together with the parameters needed to
/// invert the encoding.
#[derive(Debug, Clone)]
pub struct QuantizedDsm {
    /// Row-major u16 codes; `no_data_code` marks missing pixels.
    pub codes: Vec<u16>,
    pub width: usize,
    pub height: usize,
    /// Minimum valid elevation of the input; code 0 decodes to this.
    pub z_offset: f64,
    pub z_scale: f64,
    pub no_data_code: u16,
}

impl QuantizedDsm {
    /// Decode one code back to an elevation. `None` for the no-data
    /// sentinel, whose decoding is undefined.
    pub fn decode(&self, code: u16) -> Option<f64> {
        if code == self.no_data_code {
            None
        } else {
            Some(code as f64 * self.z_scale + self.z_offset)
        }
    }
}

/// Quantize a row-major elevation grid.
///
/// Pixels equal to `no_data` (exact comparison) and NaN pixels are
/// treated as missing and encoded as [`NO_DATA_CODE`]. Fails with
/// `EmptyRaster` when no pixel is valid, and with `RangeOverflow` when
/// the elevation span after offsetting exceeds the encodable range
/// rather than silently wrapping.
pub fn quantize(
    elevation: &[f32],
    width: usize,
    height: usize,
    no_data: Option<f64>,
) -> Result<QuantizedDsm> {
    debug_assert_eq!(elevation.len(), width * height);
    let sentinel = no_data.map(|v| v as f32);

    let is_missing = |v: f32| v.is_nan() || sentinel.map_or(false, |s| v == s);

    let mut z_min = f64::INFINITY;
    let mut z_max = f64::NEG_INFINITY;
    for &v in elevation {
        if !is_missing(v) {
            z_min = z_min.min(v as f64);
            z_max = z_max.max(v as f64);
        }
    }
    if !z_min.is_finite() {
        return Err(EvalError::EmptyRaster);
    }

    let span = z_max - z_min;
    if (span / Z_SCALE).round() > MAX_VALID_CODE as f64 {
        return Err(EvalError::RangeOverflow {
            span,
            max_code: MAX_VALID_CODE,
        });
    }

    let codes = elevation
        .iter()
        .map(|&v| {
            if is_missing(v) {
                NO_DATA_CODE
            } else {
                ((v as f64 - z_min) / Z_SCALE).round() as u16
            }
        })
        .collect();

    Ok(QuantizedDsm {
        codes,
        width,
        height,
        z_offset: z_min,
        z_scale: Z_SCALE,
        no_data_code: NO_DATA_CODE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_minimum_and_code_zero_decodes_to_it() {
        let elevation: Vec<f32> = vec![12.5, 3.2, 7.0, 3.2];
        let q = quantize(&elevation, 2, 2, None).unwrap();

        assert_eq!(q.z_offset, 3.2f32 as f64);
        assert_eq!(q.codes[1], 0);
        assert_eq!(q.decode(0).unwrap(), q.z_offset);
    }

    #[test]
    fn test_round_trip_within_half_step() {
        let elevation: Vec<f32> = vec![0.0, 0.04, 1.26, 9.99, 123.456, 3.333];
        let q = quantize(&elevation, 3, 2, None).unwrap();

        for (&v, &code) in elevation.iter().zip(&q.codes) {
            let decoded = q.decode(code).unwrap();
            assert!(
                (decoded - v as f64).abs() <= Z_SCALE / 2.0 + 1e-9,
                "elevation {} decoded to {} (diff {})",
                v,
                decoded,
                (decoded - v as f64).abs()
            );
        }
    }

    #[test]
    fn test_no_data_pixels_get_the_sentinel_code() {
        let elevation: Vec<f32> = vec![-9999.0, 1.0, 2.0, -9999.0];
        let q = quantize(&elevation, 2, 2, Some(-9999.0)).unwrap();

        assert_eq!(q.codes[0], NO_DATA_CODE);
        assert_eq!(q.codes[3], NO_DATA_CODE);
        assert_eq!(q.decode(NO_DATA_CODE), None);
        // The sentinel never leaks into the offset.
        assert_eq!(q.z_offset, 1.0);
        assert!(q.codes[1] != NO_DATA_CODE && q.codes[2] != NO_DATA_CODE);
    }

    #[test]
    fn test_nan_pixels_are_missing() {
        let elevation: Vec<f32> = vec![f32::NAN, 5.0];
        let q = quantize(&elevation, 2, 1, None).unwrap();
        assert_eq!(q.codes, vec![NO_DATA_CODE, 0]);
    }

    #[test]
    fn test_all_missing_is_empty_raster() {
        let elevation: Vec<f32> = vec![-9999.0; 4];
        let err = quantize(&elevation, 2, 2, Some(-9999.0)).unwrap_err();
        assert!(matches!(err, EvalError::EmptyRaster));

        let err = quantize(&[], 0, 0, None).unwrap_err();
        assert!(matches!(err, EvalError::EmptyRaster));
    }

    #[test]
    fn test_span_overflow_is_an_error_not_a_wrap() {
        // 0..7000 length units is 70000 decimeter steps, past the
        // 65534 ceiling.
        let elevation: Vec<f32> = vec![0.0, 7000.0];
        let err = quantize(&elevation, 2, 1, None).unwrap_err();
        assert!(matches!(err, EvalError::RangeOverflow { .. }));
    }

    #[test]
    fn test_span_at_the_range_edge_still_encodes() {
        let elevation: Vec<f32> = vec![0.0, 6553.4];
        let q = quantize(&elevation, 2, 1, None).unwrap();
        assert_eq!(q.codes[1], MAX_VALID_CODE);
    }
}
