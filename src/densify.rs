//! Point-cloud densification: fill gaps by jittering the planar
//! coordinates of an ASCII XYZ file.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{EvalError, Result};

/// Read whitespace-separated `x y z` lines from `input`, add
/// independent uniform jitter in `[-hrad, hrad]` to x and y, and write
/// the result to `output`, preserving z and line order. Returns the
/// number of points written.
///
/// The random source is seeded by the caller, so a fixed seed yields
/// byte-identical output across runs.
pub fn densify(input: &Path, output: &Path, hrad: f64, seed: u64) -> Result<usize> {
    if !input.is_file() {
        return Err(EvalError::NotFound(input.to_path_buf()));
    }

    let reader = BufReader::new(File::open(input)?);
    let mut points: Vec<(f64, f64, f64)> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        points.push(parse_xyz(&line, index + 1)?);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut writer = BufWriter::new(File::create(output)?);
    for (x, y, z) in &points {
        let xx = x + rng.gen_range(-hrad..=hrad);
        let yy = y + rng.gen_range(-hrad..=hrad);
        writeln!(writer, "{} {} {}", xx, yy, z)?;
    }
    writer.flush()?;

    Ok(points.len())
}

fn parse_xyz(line: &str, line_number: usize) -> Result<(f64, f64, f64)> {
    let mut fields = line.split_whitespace();
    let mut next = || -> Result<f64> {
        fields
            .next()
            .and_then(|field| field.parse().ok())
            .ok_or(EvalError::MalformedXyz { line: line_number })
    };
    Ok((next()?, next()?, next()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const INPUT: &str = "100.0 200.0 15.5\n101.25 199.5 16.0\n102.5 201.0 -3.25\n";

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.xyz");
        let out_a = temp_dir.path().join("a.xyz");
        let out_b = temp_dir.path().join("b.xyz");
        fs::write(&input, INPUT).unwrap();

        densify(&input, &out_a, 1.0, 0).unwrap();
        densify(&input, &out_b, 1.0, 0).unwrap();

        assert_eq!(fs::read(&out_a).unwrap(), fs::read(&out_b).unwrap());

        // A different seed moves the points.
        let out_c = temp_dir.path().join("c.xyz");
        densify(&input, &out_c, 1.0, 7).unwrap();
        assert_ne!(fs::read(&out_a).unwrap(), fs::read(&out_c).unwrap());
    }

    #[test]
    fn test_jitter_bounds_and_preserved_fields() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.xyz");
        let output = temp_dir.path().join("out.xyz");
        fs::write(&input, INPUT).unwrap();

        let hrad = 0.5;
        let count = densify(&input, &output, hrad, 0).unwrap();
        assert_eq!(count, 3);

        let originals: Vec<(f64, f64, f64)> = INPUT
            .lines()
            .enumerate()
            .map(|(i, line)| parse_xyz(line, i + 1).unwrap())
            .collect();
        let written = fs::read_to_string(&output).unwrap();
        let jittered: Vec<(f64, f64, f64)> = written
            .lines()
            .enumerate()
            .map(|(i, line)| parse_xyz(line, i + 1).unwrap())
            .collect();
        assert_eq!(jittered.len(), originals.len());

        for ((x, y, z), (xx, yy, zz)) in originals.iter().zip(&jittered) {
            assert!((xx - x).abs() <= hrad);
            assert!((yy - y).abs() <= hrad);
            // z and line order are untouched.
            assert_eq!(z, zz);
        }
    }

    #[test]
    fn test_malformed_record_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.xyz");
        let output = temp_dir.path().join("out.xyz");
        fs::write(&input, "1.0 2.0 3.0\n4.0 five 6.0\n").unwrap();

        let err = densify(&input, &output, 1.0, 0).unwrap_err();
        match err {
            EvalError::MalformedXyz { line } => assert_eq!(line, 2),
            other => panic!("expected MalformedXyz, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let err = densify(
            &temp_dir.path().join("missing.xyz"),
            &temp_dir.path().join("out.xyz"),
            1.0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, EvalError::NotFound(_)));
    }
}
