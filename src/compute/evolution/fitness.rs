//! Fitness evaluation: render a genome and compare it with the target.
//!
//! Fitness is the sum of squared per-channel differences over all pixels.
//! Lower is better and zero means a pixel-identical match.

use crate::compute::render::{RenderError, Renderer};
use crate::compute::target::TargetImage;
use crate::schema::Genome;

/// Evaluates genomes against a fixed target image.
pub struct FitnessEvaluator<R> {
    renderer: R,
    target: TargetImage,
}

impl<R: Renderer> FitnessEvaluator<R> {
    /// Create a new fitness evaluator.
    pub fn new(renderer: R, target: TargetImage) -> Self {
        Self { renderer, target }
    }

    /// Score a genome; see [`evaluate_against`].
    pub fn evaluate(&self, genome: &Genome) -> Result<u64, RenderError> {
        evaluate_against(&self.renderer, genome, &self.target)
    }

    /// Render a genome at the target's size.
    pub fn render(&self, genome: &Genome) -> Result<Vec<u8>, RenderError> {
        self.renderer
            .render(genome, self.target.width(), self.target.height())
    }
}

/// Render `genome` at the target's size and return its squared RGB distance.
///
/// A rendered buffer whose length differs from the target's is a contract
/// violation and is reported as [`RenderError::BufferSize`] instead of being
/// truncated or padded.
pub fn evaluate_against<R: Renderer + ?Sized>(
    renderer: &R,
    genome: &Genome,
    target: &TargetImage,
) -> Result<u64, RenderError> {
    let rendered = renderer.render(genome, target.width(), target.height())?;
    let expected = target.pixels().len();
    if rendered.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: rendered.len(),
        });
    }
    Ok(squared_distance(&rendered, target.pixels()))
}

/// Sum of squared byte differences between two equally sized buffers.
pub fn squared_distance(a: &[u8], b: &[u8]) -> u64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x.abs_diff(y) as u64;
            d * d
        })
        .sum()
}
