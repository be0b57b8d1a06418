use anyhow::Result;
use clap::{Parser, Subcommand};
use rayon::ThreadPoolBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a DSM GeoTIFF (or a directory of them) and the paired
    /// CLS rasters into evaluation PNG + JSON products
    Convert {
        /// Input DSM GeoTIFF or directory
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Worker threads for directory batches (default: CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Densify an ASCII XYZ point cloud by jittering x/y coordinates
    Densify {
        /// Input XYZ file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output XYZ file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Horizontal jitter radius in length units
        #[arg(long, default_value_t = 1.0)]
        hrad: f64,

        /// Random seed; a fixed seed reproduces the output exactly
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let start_time = std::time::Instant::now();

    match cli.command {
        Command::Convert { input, threads } => {
            if let Some(threads) = threads {
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()
                    .expect("Failed to build thread pool");
            }

            if input.is_file() {
                info!("Processing DSM file: {:?}", input);
                process_file(&input)?;
            } else if input.is_dir() {
                info!("Processing directory: {:?}", input);
                process_directory(&input)?;
            } else {
                error!("Invalid input path: {:?}", input);
                anyhow::bail!("Input path must be a file or directory");
            }
        }
        Command::Densify {
            input,
            output,
            hrad,
            seed,
        } => {
            let count = dsm_eval::densify(&input, &output, hrad, seed)?;
            info!("Densified {} points into {:?}", count, output);
        }
    }

    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}

fn process_file(path: &Path) -> Result<()> {
    let product = dsm_eval::convert_for_eval(path)?;
    info!(
        "Written: {:?}, {:?}, {:?}",
        product.dsm_image, product.cls_image, product.metadata
    );
    Ok(())
}

fn process_directory(dir: &Path) -> Result<()> {
    use rayon::prelude::*;

    let input_files = collect_dsm_files(dir)?;
    info!("Found {} DSM rasters", input_files.len());

    // Conversions are independent per pair; run them in parallel.
    let results: Vec<Result<()>> = input_files.par_iter().map(|path| process_file(path)).collect();

    let mut errors = Vec::new();
    for (i, result) in results.into_iter().enumerate() {
        if let Err(e) = result {
            errors.push(format!("{}: {}", input_files[i].display(), e));
        }
    }

    if !errors.is_empty() {
        error!("Failed to process {} files:", errors.len());
        for err in &errors {
            error!("  {}", err);
        }
        anyhow::bail!("{} files failed to process", errors.len());
    }

    Ok(())
}

/// Recursively collect GeoTIFFs whose file name carries the DSM marker.
fn collect_dsm_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            files.extend(collect_dsm_files(&path)?);
        } else {
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            let ext = path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            if name.contains("DSM") && matches!(ext.as_str(), "tif" | "tiff") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}
