//! Configuration types for a genetic art run.
//!
//! Every value here is fixed when the engine is built; nothing is tuned while
//! evolution is running.

use serde::{Deserialize, Serialize};

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Canvas width in pixels. The target image must match.
    #[serde(default = "default_canvas")]
    pub width: u32,
    /// Canvas height in pixels. The target image must match.
    #[serde(default = "default_canvas")]
    pub height: u32,
    /// Number of genomes in the population (P).
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of triangles per genome (N).
    #[serde(default = "default_triangle_count")]
    pub triangle_count: usize,
    /// Fraction of the population kept unchanged each generation.
    #[serde(default = "default_elite_fraction")]
    pub elite_fraction: f64,
    /// Alpha shared by every triangle.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Opaque canvas colour the triangles are painted over.
    #[serde(default)]
    pub background: [u8; 3],
    /// Operator probabilities and mutation magnitudes.
    #[serde(default)]
    pub operators: OperatorConfig,
    /// Optional stop conditions. Without them the run goes until cancelled.
    #[serde(default)]
    pub stop: StopConfig,
    /// Random seed for reproducibility. `None` seeds from entropy.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            width: default_canvas(),
            height: default_canvas(),
            population_size: default_population_size(),
            triangle_count: default_triangle_count(),
            elite_fraction: default_elite_fraction(),
            opacity: default_opacity(),
            background: [0, 0, 0],
            operators: OperatorConfig::default(),
            stop: StopConfig::default(),
            random_seed: None,
        }
    }
}

fn default_canvas() -> u32 {
    512
}
fn default_population_size() -> usize {
    30
}
fn default_triangle_count() -> usize {
    150
}
fn default_elite_fraction() -> f64 {
    0.25
}
fn default_opacity() -> f32 {
    0.15
}

/// Probabilities and magnitudes for crossover and mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Chance a non-elite slot is refilled by crossover rather than mutation.
    #[serde(default = "default_crossover_probability")]
    pub crossover_probability: f32,
    /// Chance a crossover is one-point rather than uniform.
    #[serde(default = "default_half")]
    pub one_point_probability: f32,
    /// Chance a mutation is a disturb rather than a reset.
    #[serde(default = "default_disturb_probability")]
    pub disturb_probability: f32,
    /// Disturb intensity is `disturb_scale * uniform(-1, 1)`, drawn per mutation.
    #[serde(default = "default_disturb_scale")]
    pub disturb_scale: f32,
    /// Per-vertex chance of a positional disturbance.
    #[serde(default = "default_vertex_disturb_probability")]
    pub vertex_disturb_probability: f32,
    /// Per-triangle chance of a colour disturbance.
    #[serde(default = "default_half")]
    pub color_disturb_probability: f32,
    /// Colour perturbations are this many times larger than positional ones.
    #[serde(default = "default_color_disturb_gain")]
    pub color_disturb_gain: f32,
    /// Per-coordinate (and per-triangle colour) chance of a fresh draw in reset mutation.
    #[serde(default = "default_half")]
    pub reset_probability: f32,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            crossover_probability: default_crossover_probability(),
            one_point_probability: default_half(),
            disturb_probability: default_disturb_probability(),
            disturb_scale: default_disturb_scale(),
            vertex_disturb_probability: default_vertex_disturb_probability(),
            color_disturb_probability: default_half(),
            color_disturb_gain: default_color_disturb_gain(),
            reset_probability: default_half(),
        }
    }
}

fn default_crossover_probability() -> f32 {
    0.95
}
fn default_disturb_probability() -> f32 {
    0.95
}
fn default_disturb_scale() -> f32 {
    500.0
}
fn default_vertex_disturb_probability() -> f32 {
    0.25
}
fn default_color_disturb_gain() -> f32 {
    10.0
}
fn default_half() -> f32 {
    0.5
}

/// Optional stop conditions checked between generations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopConfig {
    /// Stop after this many generations.
    #[serde(default)]
    pub max_generations: Option<u64>,
    /// Stop once the best fitness is at or below this value.
    #[serde(default)]
    pub target_fitness: Option<u64>,
}

impl EvolutionConfig {
    /// Number of elite slots: `P - ceil(P * (1 - E))`.
    pub fn elite_count(&self) -> usize {
        let regenerated = (self.population_size as f64 * (1.0 - self.elite_fraction)).ceil();
        self.population_size
            .saturating_sub(regenerated.max(0.0) as usize)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.triangle_count == 0 {
            return Err(ConfigError::NoTriangles);
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(ConfigError::InvalidProbability {
                name: "elite_fraction",
                value: self.elite_fraction as f32,
            });
        }
        let elites = self.elite_count();
        if elites == 0 || elites >= self.population_size {
            return Err(ConfigError::InvalidEliteCount {
                elites,
                population: self.population_size,
            });
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::InvalidOpacity(self.opacity));
        }

        let ops = &self.operators;
        for (name, value) in [
            ("crossover_probability", ops.crossover_probability),
            ("one_point_probability", ops.one_point_probability),
            ("disturb_probability", ops.disturb_probability),
            ("vertex_disturb_probability", ops.vertex_disturb_probability),
            ("color_disturb_probability", ops.color_disturb_probability),
            ("reset_probability", ops.reset_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if !ops.disturb_scale.is_finite() || ops.disturb_scale == 0.0 {
            return Err(ConfigError::InvalidDisturbScale(ops.disturb_scale));
        }
        if !ops.color_disturb_gain.is_finite() {
            return Err(ConfigError::InvalidColorGain(ops.color_disturb_gain));
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Canvas dimensions must be non-zero")]
    InvalidDimensions,
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Triangle count must be non-zero")]
    NoTriangles,
    #[error("Elite fraction gives {elites} elites out of {population}; need at least one elite and one regenerated slot")]
    InvalidEliteCount { elites: usize, population: usize },
    #[error("Opacity {0} must be within [0, 1]")]
    InvalidOpacity(f32),
    #[error("Probability {name} = {value} must be within [0, 1]")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("Disturb scale {0} must be finite and non-zero")]
    InvalidDisturbScale(f32),
    #[error("Colour disturb gain {0} must be finite")]
    InvalidColorGain(f32),
}
