//! Batch build command implementation

use anyhow::{bail, Context, Result};
use hanji_core::construct::{build_from_blocks, BuildOptions};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Build packages for every blocks JSON file in a directory
pub fn batch(input_dir: &str, output_dir: &str, jobs: usize) -> Result<()> {
    let input_path = Path::new(input_dir);
    let output_path = Path::new(output_dir);

    fs::create_dir_all(output_path)?;

    let files: Vec<_> = fs::read_dir(input_path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        println!("No blocks JSON files found in {}", input_dir);
        return Ok(());
    }

    println!("Found {} files to build", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let success_count = AtomicUsize::new(0);
    let error_count = AtomicUsize::new(0);

    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build_global()
        .ok(); // Ignore if already configured

    files.par_iter().for_each(|file_path| {
        match process_file(file_path, output_path) {
            Ok(_) => {
                success_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                error_count.fetch_add(1, Ordering::Relaxed);
                tracing::error!("Failed to build {:?}: {}", file_path, e);
            }
        }
        pb.inc(1);
    });

    pb.finish();

    let success = success_count.load(Ordering::Relaxed);
    let errors = error_count.load(Ordering::Relaxed);

    println!("\nBatch build complete:");
    println!("  Success: {}", success);
    println!("  Errors:  {}", errors);

    if errors > 0 {
        bail!("Batch build completed with {} errors", errors);
    }

    Ok(())
}

fn process_file(input_path: &Path, output_dir: &Path) -> Result<()> {
    let raw = fs::read_to_string(input_path)?;
    let file: super::build::BlocksFile =
        serde_json::from_str(&raw).with_context(|| format!("Invalid blocks JSON: {:?}", input_path))?;

    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("Could not determine output filename from input")?;

    let options = BuildOptions {
        title: stem.to_string(),
        ..BuildOptions::default()
    };
    let doc = build_from_blocks(file.blocks, &file.pages, &options)?;

    let output_file = output_dir.join(format!("{}.hwpx", stem));
    let bytes = hanji_core::codec::encode(&doc)?;
    fs::write(&output_file, bytes)?;

    tracing::info!("Built {:?} -> {:?}", input_path, output_file);
    Ok(())
}
