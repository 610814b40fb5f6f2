//! Genome manipulation utilities for evolutionary search.
//!
//! Provides random generation, crossover, and mutation operations. Every
//! operator keeps vertex coordinates and colour channels inside [0, 1]; a
//! value pushed outside that range is redrawn uniformly, never clamped.

use rand::prelude::*;

use crate::schema::{Genome, OperatorConfig, Triangle, Vertex};

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in [0, 1), used for every probability test.
    #[inline]
    pub fn coin(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }

    /// Uniform draw in the closed interval [0, 1].
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0..=1.0)
    }

    /// Uniform draw in [-1, 1].
    #[inline]
    pub fn signed_unit(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }

    /// Uniform index in `0..len`.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Generate next u64 for seeding child RNGs.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.r#gen()
    }

    /// A triangle with uniform vertices and colour, and the given alpha.
    pub fn random_triangle(&mut self, opacity: f32) -> Triangle {
        let vertices = [(); 3].map(|_| Vertex::new(self.unit(), self.unit()));
        Triangle::new(vertices, [self.unit(), self.unit(), self.unit(), opacity])
    }

    /// Generate a random genome of `count` triangles.
    pub fn random_genome(&mut self, count: usize, opacity: f32) -> Genome {
        Genome::new((0..count).map(|_| self.random_triangle(opacity)).collect())
    }

    /// Re-randomize every gene in place, keeping the triangle count.
    pub fn randomize(&mut self, genome: &mut Genome, opacity: f32) {
        for triangle in &mut genome.triangles {
            *triangle = self.random_triangle(opacity);
        }
    }

    /// One-point crossover with a random cut `p = ceil(u * N)`, `u` in [0, 1).
    pub fn one_point_crossover(&mut self, a: &Genome, b: &Genome) -> Genome {
        let u: f64 = self.rng.r#gen();
        let cut = (u * a.len() as f64).ceil() as usize;
        one_point_crossover_at(a, b, cut)
    }

    /// Uniform crossover: each gene comes whole from one parent on a fair coin.
    pub fn uniform_crossover(&mut self, a: &Genome, b: &Genome) -> Genome {
        debug_assert_eq!(a.len(), b.len());
        let triangles = a
            .triangles
            .iter()
            .zip(&b.triangles)
            .map(|(ta, tb)| if self.coin() < 0.5 { *ta } else { *tb })
            .collect();
        Genome::new(triangles)
    }

    /// Intensity for one disturb mutation: `scale * uniform(-1, 1)`.
    ///
    /// Small or negative values are legal. Perturbations they push out of
    /// range are redrawn by [`GenomeRng::disturb_mutate`].
    pub fn disturb_intensity(&mut self, scale: f32) -> f32 {
        scale * self.signed_unit()
    }

    /// Nudge vertices and colours by amounts inversely proportional to `intensity`.
    ///
    /// Each vertex moves with `vertex_disturb_probability`, both coordinates by
    /// `uniform(-1, 1) / intensity`. Each triangle's RGB moves with
    /// `color_disturb_probability`, each channel by
    /// `color_disturb_gain * uniform(-1, 1) / intensity`. Alpha is untouched.
    pub fn disturb_mutate(&mut self, genome: &mut Genome, intensity: f32, ops: &OperatorConfig) {
        for triangle in &mut genome.triangles {
            for vertex in &mut triangle.vertices {
                if self.coin() < ops.vertex_disturb_probability {
                    vertex.x += self.signed_unit() / intensity;
                    vertex.y += self.signed_unit() / intensity;
                }
                vertex.x = self.redraw_if_out_of_range(vertex.x);
                vertex.y = self.redraw_if_out_of_range(vertex.y);
            }

            if self.coin() < ops.color_disturb_probability {
                for channel in &mut triangle.rgba[..3] {
                    *channel += ops.color_disturb_gain * self.signed_unit() / intensity;
                }
            }
            for channel in 0..3 {
                triangle.rgba[channel] = self.redraw_if_out_of_range(triangle.rgba[channel]);
            }
        }
    }

    /// Coarse mutation: each coordinate independently, and each triangle's RGB
    /// as a group, is replaced by fresh draws with `probability`.
    pub fn reset_mutate(&mut self, genome: &mut Genome, probability: f32) {
        for triangle in &mut genome.triangles {
            for vertex in &mut triangle.vertices {
                if self.coin() < probability {
                    vertex.x = self.unit();
                }
                if self.coin() < probability {
                    vertex.y = self.unit();
                }
            }
            if self.coin() < probability {
                triangle.rgba[0] = self.unit();
                triangle.rgba[1] = self.unit();
                triangle.rgba[2] = self.unit();
            }
        }
    }

    /// Values outside [0, 1] (or NaN) are replaced by an independent uniform draw.
    #[inline]
    fn redraw_if_out_of_range(&mut self, value: f32) -> f32 {
        if (0.0..=1.0).contains(&value) {
            value
        } else {
            self.unit()
        }
    }
}

/// One-point crossover at a fixed cut: genes `0..cut` from `a`, the rest from `b`.
///
/// `cut == 0` copies `b`; `cut >= N` copies `a`.
pub fn one_point_crossover_at(a: &Genome, b: &Genome, cut: usize) -> Genome {
    debug_assert_eq!(a.len(), b.len());
    let triangles = a
        .triangles
        .iter()
        .zip(&b.triangles)
        .enumerate()
        .map(|(i, (ta, tb))| if i < cut { *ta } else { *tb })
        .collect();
    Genome::new(triangles)
}
