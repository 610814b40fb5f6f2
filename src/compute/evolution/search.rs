//! Generation loop: elitism, crossover/mutation refill, re-evaluation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::compute::render::{RenderError, Renderer};
use crate::compute::target::{TargetError, TargetImage};
use crate::schema::{
    ConfigError, EvolutionConfig, GenerationReport, Genome, OperatorConfig, OperatorCounts,
    Origin, RunSummary, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::genome::GenomeRng;
use super::population::{Candidate, Population};

/// Errors that abort a run. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid target image: {0}")]
    Target(#[from] TargetError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Initial population has {actual} genomes of lengths {lengths:?}; expected {expected} genomes of {triangles} triangles")]
    PopulationShape {
        expected: usize,
        triangles: usize,
        actual: usize,
        lengths: Vec<usize>,
    },

    #[error("Initial genome {index} has values outside [0, 1] or an alpha other than the configured opacity {opacity}")]
    InvalidGenome { index: usize, opacity: f32 },
}

/// Evolution engine that owns the population, RNG and evaluator.
///
/// Each call to [`EvolutionEngine::step`] runs one complete generation. Between
/// calls the population is always sorted best-first.
pub struct EvolutionEngine<R> {
    config: EvolutionConfig,
    rng: GenomeRng,
    evaluator: FitnessEvaluator<R>,
    population: Population,
    generation: u64,
    evaluations: u64,
    next_id: u64,
    cancelled: Arc<AtomicBool>,
}

impl<R: Renderer> EvolutionEngine<R> {
    /// Create an engine with a randomized, evaluated and sorted population.
    pub fn new(
        config: EvolutionConfig,
        target: TargetImage,
        renderer: R,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::empty(config, target, renderer)?;
        let (count, opacity) = (engine.config.triangle_count, engine.config.opacity);
        let genomes = (0..engine.config.population_size)
            .map(|_| engine.rng.random_genome(count, opacity))
            .collect();
        engine.seed_population(genomes)?;
        Ok(engine)
    }

    /// Create an engine from caller-supplied genomes.
    ///
    /// There must be exactly `population_size` genomes of `triangle_count`
    /// triangles each, with every coordinate and colour in [0, 1] and every
    /// alpha equal to the configured opacity. They are evaluated and sorted
    /// like a random start.
    pub fn from_genomes(
        config: EvolutionConfig,
        target: TargetImage,
        renderer: R,
        genomes: Vec<Genome>,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::empty(config, target, renderer)?;
        let shape_ok = genomes.len() == engine.config.population_size
            && genomes
                .iter()
                .all(|g| g.len() == engine.config.triangle_count);
        if !shape_ok {
            return Err(EngineError::PopulationShape {
                expected: engine.config.population_size,
                triangles: engine.config.triangle_count,
                actual: genomes.len(),
                lengths: genomes.iter().map(Genome::len).collect(),
            });
        }
        let opacity = engine.config.opacity;
        if let Some(index) = genomes.iter().position(|g| {
            !g.is_in_bounds() || g.triangles.iter().any(|t| t.rgba[3] != opacity)
        }) {
            return Err(EngineError::InvalidGenome { index, opacity });
        }
        engine.seed_population(genomes)?;
        Ok(engine)
    }

    fn empty(config: EvolutionConfig, target: TargetImage, renderer: R) -> Result<Self, EngineError> {
        config.validate()?;
        target.expect_size(config.width, config.height)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        log::info!(
            "Genetic art: {}x{} canvas, {} genomes x {} triangles, {} elites, seed {}",
            config.width,
            config.height,
            config.population_size,
            config.triangle_count,
            config.elite_count(),
            seed
        );

        Ok(Self {
            rng: GenomeRng::new(seed),
            evaluator: FitnessEvaluator::new(renderer, target),
            config,
            population: Population::default(),
            generation: 0,
            evaluations: 0,
            next_id: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    fn seed_population(&mut self, genomes: Vec<Genome>) -> Result<(), EngineError> {
        let evaluator = &self.evaluator;
        let scores = genomes
            .par_iter()
            .map(|genome| evaluator.evaluate(genome))
            .collect::<Result<Vec<_>, _>>()?;

        let candidates = genomes
            .into_iter()
            .zip(scores)
            .map(|(genome, fitness)| {
                let id = self.next_id;
                self.next_id += 1;
                Candidate {
                    id,
                    genome,
                    fitness,
                    origin: Origin::Initial,
                    generation: 0,
                }
            })
            .collect();

        self.evaluations += self.config.population_size as u64;
        self.population = Population::new(candidates);
        self.population.sort();
        log::info!(
            "Initial population evaluated, best fitness {}",
            self.population[0].fitness
        );
        Ok(())
    }

    /// Get cancellation handle. Setting it stops the run before the next generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Advance one generation.
    ///
    /// Sorts, keeps the elite slots untouched (fitness included), refills every
    /// other slot by crossover or mutation, evaluates the new occupants and
    /// sorts again. Offspring are bred from the population as it stood when the
    /// generation began. Each slot draws from its own RNG stream, seeded in slot
    /// order, so the outcome does not depend on how rayon schedules the work.
    pub fn step(&mut self) -> Result<GenerationReport, EngineError> {
        self.population.sort();

        let elites = self.config.elite_count();
        let jobs: Vec<(usize, u64)> = (elites..self.population.len())
            .map(|slot| (slot, self.rng.next_seed()))
            .collect();

        let parents = &self.population;
        let evaluator = &self.evaluator;
        let ops = &self.config.operators;
        let offspring = jobs
            .par_iter()
            .map(|&(slot, seed)| -> Result<_, RenderError> {
                let mut rng = GenomeRng::new(seed);
                let (genome, origin) = regenerate_slot(&mut rng, parents, slot, ops);
                let fitness = evaluator.evaluate(&genome)?;
                Ok((slot, genome, origin, fitness))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.generation += 1;
        let mut operators = OperatorCounts::default();
        for (slot, genome, origin, fitness) in offspring {
            operators.record(origin);
            let id = self.next_id;
            self.next_id += 1;
            self.population.replace(
                slot,
                Candidate {
                    id,
                    genome,
                    fitness,
                    origin,
                    generation: self.generation,
                },
            );
        }
        self.evaluations += jobs.len() as u64;
        self.population.sort();

        let report = self.report(operators);
        log::debug!(
            "Generation {}: best {} mean {:.0} worst {} ({:?})",
            report.generation,
            report.best_fitness,
            report.mean_fitness,
            report.worst_fitness,
            report.operators
        );
        Ok(report)
    }

    fn report(&self, operators: OperatorCounts) -> GenerationReport {
        GenerationReport {
            generation: self.generation,
            best_fitness: self.best().fitness,
            mean_fitness: self.population.mean_fitness(),
            worst_fitness: self.population.worst().map_or(0, |c| c.fitness),
            operators,
        }
    }

    /// Why the run should stop now, if it should. Checked between generations.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if let Some(max) = self.config.stop.max_generations
            && self.generation >= max
        {
            return Some(StopReason::MaxGenerations);
        }

        if let Some(target) = self.config.stop.target_fitness
            && self.best().fitness <= target
        {
            return Some(StopReason::TargetReached);
        }

        None
    }

    /// Run generations until a stop condition or cancellation, calling
    /// `callback` after each one.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> Result<RunSummary, EngineError>
    where
        F: FnMut(&GenerationReport),
    {
        let start_time = Instant::now();

        let stop_reason = loop {
            if let Some(reason) = self.stop_reason() {
                break reason;
            }
            let report = self.step()?;
            callback(&report);
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        log::info!(
            "Stopped after {} generations ({:?}), best fitness {}",
            self.generation,
            stop_reason,
            self.best().fitness
        );

        Ok(RunSummary {
            generations: self.generation,
            best_fitness: self.best().fitness,
            total_evaluations: self.evaluations,
            elapsed_seconds: elapsed,
            stop_reason,
        })
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> Result<RunSummary, EngineError> {
        self.run_with_callback(|_| {})
    }

    /// Current best candidate, for display. Read-only.
    pub fn best(&self) -> &Candidate {
        &self.population[0]
    }

    /// Render the current best genome at canvas size.
    pub fn render_best(&self) -> Result<Vec<u8>, RenderError> {
        self.evaluator.render(&self.best().genome)
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations completed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fitness evaluations performed, including the initial population.
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &FitnessEvaluator<R> {
        &self.evaluator
    }
}

/// Produce the next occupant of one non-elite slot.
///
/// With `crossover_probability` two parents are drawn uniformly from the whole
/// population (with replacement) and combined by one-point or uniform
/// crossover. Otherwise the slot's current occupant is copied and mutated,
/// by disturb or, rarely, by reset.
fn regenerate_slot(
    rng: &mut GenomeRng,
    population: &Population,
    slot: usize,
    ops: &OperatorConfig,
) -> (Genome, Origin) {
    if rng.coin() < ops.crossover_probability {
        let a = &population[rng.index(population.len())].genome;
        let b = &population[rng.index(population.len())].genome;
        if rng.coin() < ops.one_point_probability {
            (rng.one_point_crossover(a, b), Origin::OnePointCrossover)
        } else {
            (rng.uniform_crossover(a, b), Origin::UniformCrossover)
        }
    } else {
        let mut genome = population[slot].genome.clone();
        if rng.coin() < ops.disturb_probability {
            let intensity = rng.disturb_intensity(ops.disturb_scale);
            rng.disturb_mutate(&mut genome, intensity, ops);
            (genome, Origin::DisturbMutation)
        } else {
            rng.reset_mutate(&mut genome, ops.reset_probability);
            (genome, Origin::ResetMutation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::render::SoftwareRenderer;
    use crate::schema::{StopConfig, Triangle, Vertex};

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            width: 16,
            height: 16,
            population_size: 12,
            triangle_count: 10,
            random_seed: Some(42),
            ..Default::default()
        }
    }

    fn gradient_target(width: u32, height: u32) -> TargetImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 15) as u8, (y * 15) as u8, 128]);
            }
        }
        TargetImage::from_raw(width, height, pixels).unwrap()
    }

    fn engine(config: EvolutionConfig) -> EvolutionEngine<SoftwareRenderer> {
        let target = gradient_target(config.width, config.height);
        EvolutionEngine::new(config, target, SoftwareRenderer::default()).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine(small_config());
        assert_eq!(engine.population().len(), 12);
        assert!(engine.population().is_sorted());
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.evaluations(), 12);
        assert!(engine.population().iter().all(|c| c.genome.len() == 10));
    }

    #[test]
    fn test_target_size_mismatch() {
        let result = EvolutionEngine::new(
            small_config(),
            gradient_target(8, 8),
            SoftwareRenderer::default(),
        );
        assert!(matches!(
            result,
            Err(EngineError::Target(TargetError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EvolutionConfig {
            triangle_count: 0,
            ..small_config()
        };
        let result = EvolutionEngine::new(config, gradient_target(16, 16), SoftwareRenderer::default());
        assert!(matches!(result, Err(EngineError::Config(ConfigError::NoTriangles))));
    }

    #[test]
    fn test_population_size_and_best_monotonic() {
        let mut engine = engine(small_config());
        let mut best = engine.best().fitness;
        for g in 1..=25 {
            let report = engine.step().unwrap();
            assert_eq!(report.generation, g);
            assert_eq!(engine.population().len(), 12);
            assert!(engine.population().is_sorted());
            assert!(report.best_fitness <= best);
            assert_eq!(report.operators.total(), 12 - engine.config().elite_count());
            best = report.best_fitness;
        }
        assert_eq!(engine.evaluations(), 12 + 25 * 9);
    }

    #[test]
    fn test_elites_preserved_with_fitness() {
        let mut engine = engine(small_config());
        let elites: Vec<Candidate> = engine.population().as_slice()[..engine.config().elite_count()].to_vec();

        engine.step().unwrap();

        for elite in &elites {
            let survivor = engine
                .population()
                .iter()
                .find(|c| c.id == elite.id)
                .expect("elite survives");
            assert_eq!(survivor, elite);
        }
    }

    #[test]
    fn test_fitness_cache_matches_genome() {
        let mut engine = engine(small_config());
        for _ in 0..5 {
            engine.step().unwrap();
        }
        for candidate in engine.population() {
            assert_eq!(
                engine.evaluator().evaluate(&candidate.genome).unwrap(),
                candidate.fitness
            );
            assert!(candidate.genome.is_in_bounds());
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let mut a = engine(small_config());
        let mut b = engine(small_config());
        for _ in 0..5 {
            a.step().unwrap();
            b.step().unwrap();
        }
        let fa: Vec<u64> = a.population().iter().map(|c| c.fitness).collect();
        let fb: Vec<u64> = b.population().iter().map(|c| c.fitness).collect();
        assert_eq!(fa, fb);
        assert_eq!(a.best().genome, b.best().genome);
    }

    #[test]
    fn test_all_mutation_path() {
        let mut config = small_config();
        config.operators.crossover_probability = 0.0;
        config.operators.disturb_probability = 0.0;
        let mut engine = engine(config);
        let report = engine.step().unwrap();
        assert_eq!(report.operators.reset, 9);
        assert_eq!(report.operators.total(), 9);
    }

    #[test]
    fn test_mutation_starts_from_slot_occupant() {
        // With no coordinate redrawn, a reset offspring is a copy of its own slot.
        let mut config = small_config();
        config.operators.crossover_probability = 0.0;
        config.operators.disturb_probability = 0.0;
        config.operators.reset_probability = 0.0;
        let mut engine = engine(config);
        let elites = engine.config().elite_count();
        let before: Vec<Candidate> = engine.population().iter().cloned().collect();

        engine.step().unwrap();

        for (slot, (old, new)) in before.iter().zip(engine.population()).enumerate() {
            assert_eq!(new.genome, old.genome, "slot {slot}");
            assert_eq!(new.fitness, old.fitness, "slot {slot}");
            if slot < elites {
                assert_eq!(new.id, old.id);
            } else {
                assert_eq!(new.origin, Origin::ResetMutation);
                assert_eq!(new.generation, 1);
            }
        }
    }

    #[test]
    fn test_max_generations() {
        let config = EvolutionConfig {
            stop: StopConfig {
                max_generations: Some(4),
                target_fitness: None,
            },
            ..small_config()
        };
        let mut engine = engine(config);
        let mut seen = Vec::new();
        let summary = engine.run_with_callback(|r| seen.push(r.generation)).unwrap();
        assert_eq!(summary.stop_reason, StopReason::MaxGenerations);
        assert_eq!(summary.generations, 4);
        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_cancellation() {
        let mut engine = engine(small_config());
        let cancel = engine.cancel_handle();

        // Cancel immediately
        cancel.store(true, Ordering::Relaxed);

        let summary = engine.run().unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.generations, 0);
    }

    #[test]
    fn test_cancel_from_callback() {
        let mut engine = engine(small_config());
        let cancel = engine.cancel_handle();
        let summary = engine
            .run_with_callback(|r| {
                if r.generation == 3 {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();
        assert_eq!(summary.stop_reason, StopReason::Cancelled);
        assert_eq!(summary.generations, 3);
    }

    fn red_square() -> Genome {
        // Two opaque halves split along the diagonal cover every pixel once.
        Genome::new(vec![
            Triangle::new(
                [
                    Vertex::new(0.0, 0.0),
                    Vertex::new(1.0, 0.0),
                    Vertex::new(0.0, 1.0),
                ],
                [1.0, 0.0, 0.0, 1.0],
            ),
            Triangle::new(
                [
                    Vertex::new(1.0, 0.0),
                    Vertex::new(1.0, 1.0),
                    Vertex::new(0.0, 1.0),
                ],
                [1.0, 0.0, 0.0, 1.0],
            ),
        ])
    }

    fn red_config() -> EvolutionConfig {
        EvolutionConfig {
            width: 2,
            height: 2,
            population_size: 4,
            triangle_count: 2,
            opacity: 1.0,
            stop: StopConfig {
                max_generations: Some(100),
                target_fitness: Some(0),
            },
            random_seed: Some(5),
            ..Default::default()
        }
    }

    #[test]
    fn test_target_reached_with_perfect_genome() {
        let red = red_square();
        let mut rng = GenomeRng::new(1);
        let mut genomes = vec![red.clone()];
        genomes.extend((0..3).map(|_| rng.random_genome(2, 1.0)));

        let mut engine = red_engine(genomes).unwrap();
        assert_eq!(engine.best().fitness, 0);
        assert_eq!(engine.best().genome, red);

        let summary = engine.run().unwrap();
        assert_eq!(summary.stop_reason, StopReason::TargetReached);
        assert_eq!(summary.generations, 0);
    }

    fn red_engine(genomes: Vec<Genome>) -> Result<EvolutionEngine<SoftwareRenderer>, EngineError> {
        let target = TargetImage::solid(2, 2, [255, 0, 0]).unwrap();
        EvolutionEngine::from_genomes(red_config(), target, SoftwareRenderer::default(), genomes)
    }

    #[test]
    fn test_from_genomes_rejects_out_of_range_genes() {
        let mut outside = red_square();
        outside.triangles[0].vertices[0] = Vertex::new(5.0, -3.0);
        let result = red_engine(vec![red_square(), red_square(), outside, red_square()]);
        assert!(matches!(result, Err(EngineError::InvalidGenome { index: 2, .. })));

        let mut bright = red_square();
        bright.triangles[1].rgba[0] = 7.0;
        let result = red_engine(vec![bright, red_square(), red_square(), red_square()]);
        assert!(matches!(result, Err(EngineError::InvalidGenome { index: 0, .. })));

        let mut faint = red_square();
        faint.triangles[0].rgba[3] = 0.9;
        let result = red_engine(vec![red_square(), faint, red_square(), red_square()]);
        assert!(matches!(
            result,
            Err(EngineError::InvalidGenome { index: 1, opacity }) if opacity == 1.0
        ));
    }

    #[test]
    fn test_from_genomes_checks_shape() {
        let config = small_config();
        let mut rng = GenomeRng::new(2);
        let genomes = (0..3).map(|_| rng.random_genome(10, 0.15)).collect();
        let result = EvolutionEngine::from_genomes(
            config,
            gradient_target(16, 16),
            SoftwareRenderer::default(),
            genomes,
        );
        assert!(matches!(result, Err(EngineError::PopulationShape { actual: 3, .. })));
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render(&self, _: &Genome, _: u32, _: u32) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Backend("no context".into()))
        }
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let result = EvolutionEngine::new(small_config(), gradient_target(16, 16), FailingRenderer);
        assert!(matches!(result, Err(EngineError::Render(RenderError::Backend(_)))));
    }

    #[test]
    fn test_render_best() {
        let engine = engine(small_config());
        let pixels = engine.render_best().unwrap();
        assert_eq!(pixels.len(), 16 * 16 * 3);
    }
}
