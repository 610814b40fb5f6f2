//! Headless stand-in for on-screen display: write the best candidate to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compute::render::{RenderError, Renderer};
use crate::schema::Genome;

use super::search::EvolutionEngine;

/// Errors raised while exporting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to serialize genome: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Pixel buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
}

/// Files written by [`export_best`].
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub image: PathBuf,
    pub genome: PathBuf,
}

#[derive(Serialize)]
struct GenomeExport<'a> {
    generation: u64,
    fitness: u64,
    width: u32,
    height: u32,
    genome: &'a Genome,
}

/// Write an RGB buffer as a PNG.
pub fn write_png<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<(), SnapshotError> {
    let img = image::RgbImage::from_raw(width, height, pixels)
        .ok_or(SnapshotError::BufferSize { width, height })?;
    img.save(path)?;
    Ok(())
}

/// Render the engine's best candidate to `best_gen<N>.png` and write its genome
/// to `best_gen<N>.json` inside `dir`.
pub fn export_best<R: Renderer, P: AsRef<Path>>(
    engine: &EvolutionEngine<R>,
    dir: P,
) -> Result<SnapshotPaths, SnapshotError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let generation = engine.generation();
    let best = engine.best();
    let (width, height) = (engine.config().width, engine.config().height);

    let image = dir.join(format!("best_gen{generation:06}.png"));
    write_png(&image, width, height, engine.render_best()?)?;

    let genome = dir.join(format!("best_gen{generation:06}.json"));
    let export = GenomeExport {
        generation,
        fitness: best.fitness,
        width,
        height,
        genome: &best.genome,
    };
    fs::write(&genome, serde_json::to_string_pretty(&export)?)?;

    log::debug!("Wrote snapshot {}", image.display());
    Ok(SnapshotPaths { image, genome })
}
