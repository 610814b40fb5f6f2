//! Quick evolution performance test

use genetic_art::{EvolutionConfig, EvolutionEngine, SoftwareRenderer, TargetImage};
use std::time::Instant;

fn gradient(size: u32) -> TargetImage {
    let mut pixels = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let r = (x * 255 / size) as u8;
            let g = (y * 255 / size) as u8;
            pixels.extend_from_slice(&[r, g, 255 - r / 2]);
        }
    }
    TargetImage::from_raw(size, size, pixels).expect("gradient matches its size")
}

fn main() {
    println!("=== Evolution Performance Test ===\n");

    // Test different canvas sizes
    for size in [64, 128, 256] {
        println!("Canvas size: {}x{}", size, size);

        let config = EvolutionConfig {
            width: size,
            height: size,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, gradient(size), SoftwareRenderer::default())
            .expect("valid configuration");
        let initial = engine.best().fitness;
        for _ in 0..50 {
            engine.step().expect("software rendering does not fail");
        }
        let elapsed = start.elapsed();

        let evals_per_sec = engine.evaluations() as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", engine.generation());
        println!("  Evaluations:    {}", engine.evaluations());
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Best fitness:   {} -> {}", initial, engine.best().fitness);
        println!();
    }

    println!("=== Scalability Test (fixed 128x128 canvas) ===\n");

    // Test different population sizes
    for population_size in [10, 30, 60, 120] {
        let config = EvolutionConfig {
            width: 128,
            height: 128,
            population_size,
            random_seed: Some(42),
            ..Default::default()
        };

        let start = Instant::now();
        let mut engine = EvolutionEngine::new(config, gradient(128), SoftwareRenderer::default())
            .expect("valid configuration");
        for _ in 0..20 {
            engine.step().expect("software rendering does not fail");
        }
        let elapsed = start.elapsed();

        println!(
            "Population {}: {} evals in {:.2}s ({:.1} evals/sec)",
            population_size,
            engine.evaluations(),
            elapsed.as_secs_f64(),
            engine.evaluations() as f64 / elapsed.as_secs_f64()
        );
    }
}
