use pyo3::prelude::*;
use std::path::Path;

#[pymodule]
fn dsm_eval(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(convert_for_eval, m)?)?;
    m.add_function(wrap_pyfunction!(densify, m)?)?;
    Ok(())
}

/// Convert a DSM/CLS GeoTIFF pair into evaluation products. Returns
/// the written (dsm_png, cls_png, metadata_json) paths.
#[pyfunction]
pub fn convert_for_eval(dsm_path: &str) -> PyResult<(String, String, String)> {
    let product = dsm_eval_core::convert_for_eval(Path::new(dsm_path)).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Failed to convert: {}", e))
    })?;

    Ok((
        product.dsm_image.display().to_string(),
        product.cls_image.display().to_string(),
        product.metadata.display().to_string(),
    ))
}

/// Jitter the planar coordinates of an ASCII XYZ point cloud. Returns
/// the number of points written.
#[pyfunction]
#[pyo3(signature = (input, output, hrad=1.0, seed=0))]
pub fn densify(input: &str, output: &str, hrad: f64, seed: u64) -> PyResult<usize> {
    dsm_eval_core::densify(Path::new(input), Path::new(output), hrad, seed).map_err(|e| {
        PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("Failed to densify: {}", e))
    })
}
