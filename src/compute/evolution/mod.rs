//! Evolutionary search over triangle genomes.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): random generation, one-point and
//!   uniform crossover, disturb and reset mutation
//! - **Fitness** (`fitness`): render, then sum squared RGB differences
//! - **Population** (`population`): fixed-size, sorted best-first
//! - **Search** (`search`): the generation loop with elitism
//! - **Snapshots** (`snapshot`): PNG/JSON export of the current best
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_art::compute::{SoftwareRenderer, TargetImage};
//! use genetic_art::compute::evolution::EvolutionEngine;
//! use genetic_art::schema::EvolutionConfig;
//!
//! let config = EvolutionConfig::default();
//! let target = TargetImage::load_with_size("input.bmp", config.width, config.height)?;
//! let renderer = SoftwareRenderer::new(config.background);
//!
//! let mut engine = EvolutionEngine::new(config, target, renderer)?;
//! for _ in 0..100 {
//!     let report = engine.step()?;
//!     println!("Generation {}: best fitness = {}", report.generation, report.best_fitness);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fitness;
mod genome;
mod population;
mod search;
mod snapshot;

pub use fitness::{FitnessEvaluator, evaluate_against, squared_distance};
pub use genome::{GenomeRng, one_point_crossover_at};
pub use population::{Candidate, Population};
pub use search::{EngineError, EvolutionEngine};
pub use snapshot::{SnapshotError, SnapshotPaths, export_best, write_png};
