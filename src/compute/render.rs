//! Rasterization of genomes into RGB pixel buffers.
//!
//! The [`Renderer`] trait is the only seam the fitness evaluator depends on.
//! [`SoftwareRenderer`] is a small scanline-free rasterizer that tests each
//! pixel centre in a triangle's bounding box against its three edge functions.

use crate::schema::{Genome, Triangle};

/// Error type for rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Canvas dimensions must be non-zero (got {width}x{height})")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("Renderer returned {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Renderer initialization failed: {0}")]
    Backend(String),
}

/// Rasterizes a genome into a row-major RGB buffer of `width * height * 3` bytes.
///
/// Implementations must be pure: the same genome and canvas size always give
/// the same bytes. Normalized coordinates map linearly onto the pixel grid with
/// `(0, 0)` at the first byte of the buffer. Triangles are composited in genome
/// order with alpha "over" blending.
pub trait Renderer: Send + Sync {
    fn render(&self, genome: &Genome, width: u32, height: u32) -> Result<Vec<u8>, RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&self, genome: &Genome, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        (**self).render(genome, width, height)
    }
}

/// CPU rasterizer without anti-aliasing.
///
/// A pixel is covered when its centre lies inside the triangle. Pixel centres
/// that fall exactly on an edge shared by two triangles are owned by exactly
/// one of them, so adjacent triangles never double-blend a seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareRenderer {
    background: [u8; 3],
}

impl SoftwareRenderer {
    pub fn new(background: [u8; 3]) -> Self {
        Self { background }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&self, genome: &Genome, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidCanvas { width, height });
        }

        let w = width as usize;
        let h = height as usize;
        let bg = self.background.map(|c| c as f32 / 255.0);
        let mut canvas = vec![bg; w * h];

        for triangle in &genome.triangles {
            composite_triangle(&mut canvas, w, h, triangle);
        }

        Ok(quantize(&canvas))
    }
}

/// Signed double area of `(a, b, p)`; positive when `p` is left of `a -> b`.
#[inline]
fn edge(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0)
}

/// Tie-break for pixel centres exactly on an edge. Antisymmetric in the edge
/// direction, so of two triangles sharing an edge exactly one owns it.
#[inline]
fn owns_edge(a: (f64, f64), b: (f64, f64)) -> bool {
    let dy = b.1 - a.1;
    dy > 0.0 || (dy == 0.0 && b.0 - a.0 < 0.0)
}

#[inline]
fn covers(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let e = edge(a, b, p);
    e > 0.0 || (e == 0.0 && owns_edge(a, b))
}

fn composite_triangle(canvas: &mut [[f32; 3]], w: usize, h: usize, triangle: &Triangle) {
    let alpha = triangle.rgba[3].clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let src = [
        triangle.rgba[0].clamp(0.0, 1.0),
        triangle.rgba[1].clamp(0.0, 1.0),
        triangle.rgba[2].clamp(0.0, 1.0),
    ];

    let [p0, p1, p2] = triangle
        .vertices
        .map(|v| (v.x as f64 * w as f64, v.y as f64 * h as f64));

    let area = edge(p0, p1, p2);
    // Also rejects NaN coordinates.
    if !(area.abs() > 0.0) {
        return;
    }
    let (p0, p1, p2) = if area < 0.0 { (p0, p2, p1) } else { (p0, p1, p2) };

    let min_x = p0.0.min(p1.0).min(p2.0);
    let max_x = p0.0.max(p1.0).max(p2.0);
    let min_y = p0.1.min(p1.1).min(p2.1);
    let max_y = p0.1.max(p1.1).max(p2.1);

    // Pixel i has its centre at i + 0.5.
    let x_start = (min_x - 0.5).ceil().max(0.0);
    let x_end = (max_x - 0.5).floor().min(w as f64 - 1.0);
    let y_start = (min_y - 0.5).ceil().max(0.0);
    let y_end = (max_y - 0.5).floor().min(h as f64 - 1.0);
    if x_end < x_start || y_end < y_start {
        return;
    }

    let inv = 1.0 - alpha;
    for y in y_start as usize..=y_end as usize {
        let py = y as f64 + 0.5;
        let row = &mut canvas[y * w..(y + 1) * w];
        for x in x_start as usize..=x_end as usize {
            let p = (x as f64 + 0.5, py);
            if covers(p0, p1, p) && covers(p1, p2, p) && covers(p2, p0, p) {
                let dst = &mut row[x];
                for c in 0..3 {
                    dst[c] = src[c] * alpha + dst[c] * inv;
                }
            }
        }
    }
}

fn quantize(canvas: &[[f32; 3]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(canvas.len() * 3);
    for px in canvas {
        for &c in px {
            out.push((c * 255.0).round().clamp(0.0, 255.0) as u8);
        }
    }
    out
}
