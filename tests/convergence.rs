//! End-to-end runs of the generation loop against small targets.

use genetic_art::compute::evolution::{EvolutionEngine, evaluate_against};
use genetic_art::schema::{EvolutionConfig, StopConfig, StopReason};
use genetic_art::{Genome, SoftwareRenderer, TargetImage, Triangle, Vertex};

fn two_tone(size: u32) -> TargetImage {
    let mut pixels = Vec::new();
    for _y in 0..size {
        for x in 0..size {
            let px = if x < size / 2 { [230, 40, 40] } else { [30, 60, 220] };
            pixels.extend_from_slice(&px);
        }
    }
    TargetImage::from_raw(size, size, pixels).unwrap()
}

#[test]
fn solid_red_full_cover_scores_zero() {
    let target = TargetImage::solid(2, 2, [255, 0, 0]).unwrap();
    let genome = Genome::new(vec![Triangle::new(
        [
            Vertex::new(0.0, 0.0),
            Vertex::new(2.0, 0.0),
            Vertex::new(0.0, 2.0),
        ],
        [1.0, 0.0, 0.0, 1.0],
    )]);
    let score = evaluate_against(&SoftwareRenderer::default(), &genome, &target).unwrap();
    assert_eq!(score, 0);
}

#[test]
fn evolution_improves_best_fitness() {
    let config = EvolutionConfig {
        width: 16,
        height: 16,
        population_size: 16,
        triangle_count: 20,
        opacity: 0.5,
        stop: StopConfig {
            max_generations: Some(150),
            target_fitness: None,
        },
        random_seed: Some(2024),
        ..Default::default()
    };
    let mut engine = EvolutionEngine::new(config, two_tone(16), SoftwareRenderer::default()).unwrap();
    let initial = engine.best().fitness;

    let mut history = Vec::new();
    let summary = engine
        .run_with_callback(|report| history.push(report.best_fitness))
        .unwrap();

    assert_eq!(summary.stop_reason, StopReason::MaxGenerations);
    assert_eq!(history.len(), 150);
    assert!(history.windows(2).all(|w| w[1] <= w[0]));
    assert!(summary.best_fitness < initial);
    assert_eq!(engine.population().len(), 16);
    assert!(engine.population().iter().all(|c| c.genome.is_in_bounds()));
}
