//! Genetic Art - approximate an image with semi-transparent triangles.
//!
//! A population of candidate images, each a fixed number of triangles, is
//! evolved with a genetic algorithm. Every candidate is rasterized and scored
//! by its squared RGB distance to the target image; lower is better.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Genome, configuration and progress types
//! - `compute`: Rendering, target loading, and the evolutionary engine
//!
//! # Example
//!
//! ```rust,no_run
//! use genetic_art::{EvolutionConfig, EvolutionEngine, SoftwareRenderer, TargetImage};
//!
//! let config = EvolutionConfig {
//!     width: 64,
//!     height: 64,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let target = TargetImage::load_with_size("input.png", config.width, config.height)?;
//! let renderer = SoftwareRenderer::new(config.background);
//! let mut engine = EvolutionEngine::new(config, target, renderer)?;
//!
//! let cancel = engine.cancel_handle();
//! engine.run_with_callback(|report| {
//!     if report.generation == 1000 {
//!         cancel.store(true, std::sync::atomic::Ordering::Relaxed);
//!     }
//! })?;
//!
//! println!("Best fitness: {}", engine.best().fitness);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{EngineError, EvolutionEngine};
pub use compute::{Renderer, SoftwareRenderer, TargetImage};
pub use schema::{EvolutionConfig, Genome, Triangle, Vertex};
