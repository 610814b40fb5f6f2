//! Genome types: triangles in normalized canvas space.

use serde::{Deserialize, Serialize};

/// A point in normalized canvas space. Both components live in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
}

impl Vertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single gene: three vertices plus an un-premultiplied RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertices in normalized [0, 1] canvas space.
    pub vertices: [Vertex; 3],
    /// Red, green, blue, alpha in [0, 1]. Alpha is fixed for the whole run.
    pub rgba: [f32; 4],
}

impl Triangle {
    pub fn new(vertices: [Vertex; 3], rgba: [f32; 4]) -> Self {
        Self { vertices, rgba }
    }

    /// True if every vertex coordinate and colour channel is within [0, 1].
    pub fn is_in_bounds(&self) -> bool {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        self.vertices.iter().all(|v| unit(v.x) && unit(v.y)) && self.rgba.iter().all(|&c| unit(c))
    }
}

/// One candidate image: an ordered list of triangles composited back to front.
///
/// Order matters. Triangle `i` is painted over triangles `0..i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Genome {
    pub triangles: Vec<Triangle>,
}

impl Genome {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Number of genes.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// True if every gene is within the unit bounds.
    pub fn is_in_bounds(&self) -> bool {
        self.triangles.iter().all(Triangle::is_in_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_check() {
        let mut tri = Triangle::new(
            [
                Vertex::new(0.0, 0.0),
                Vertex::new(1.0, 0.0),
                Vertex::new(0.5, 1.0),
            ],
            [0.2, 0.4, 0.6, 0.15],
        );
        assert!(tri.is_in_bounds());

        tri.vertices[2].y = 1.01;
        assert!(!tri.is_in_bounds());

        tri.vertices[2].y = f32::NAN;
        assert!(!tri.is_in_bounds());
    }

    #[test]
    fn test_serialization() {
        let genome = Genome::new(vec![Triangle::new(
            [Vertex::new(0.1, 0.2), Vertex::new(0.3, 0.4), Vertex::new(0.5, 0.6)],
            [1.0, 0.0, 0.0, 0.15],
        )]);
        let json = serde_json::to_string(&genome).unwrap();
        let parsed: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, genome);
    }
}
