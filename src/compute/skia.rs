//! tiny-skia backed renderer.
//!
//! Fills each triangle as a closed path with anti-aliasing disabled. Because
//! the canvas is cleared to an opaque colour, tiny-skia's premultiplied output
//! equals straight RGB and only the alpha byte needs to be dropped.

use tiny_skia as sk;

use super::render::{RenderError, Renderer};
use crate::schema::{Genome, Triangle};

#[derive(Debug, Clone, Copy, Default)]
pub struct SkiaRenderer {
    background: [u8; 3],
}

impl SkiaRenderer {
    pub fn new(background: [u8; 3]) -> Self {
        Self { background }
    }
}

impl Renderer for SkiaRenderer {
    fn render(&self, genome: &Genome, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let mut pix = sk::Pixmap::new(width, height)
            .ok_or(RenderError::InvalidCanvas { width, height })?;
        let [r, g, b] = self.background;
        pix.fill(sk::Color::from_rgba8(r, g, b, 255));

        for triangle in &genome.triangles {
            draw_triangle(&mut pix, triangle)?;
        }

        let rgba = pix.data();
        let mut out = Vec::with_capacity(width as usize * height as usize * 3);
        for px in rgba.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        Ok(out)
    }
}

fn draw_triangle(pix: &mut sk::Pixmap, triangle: &Triangle) -> Result<(), RenderError> {
    let (w, h) = (pix.width() as f32, pix.height() as f32);
    let [a, b, c] = triangle.vertices;

    let mut pb = sk::PathBuilder::new();
    pb.move_to(a.x * w, a.y * h);
    pb.line_to(b.x * w, b.y * h);
    pb.line_to(c.x * w, c.y * h);
    pb.close();
    // Degenerate triangles produce no path.
    let Some(path) = pb.finish() else {
        return Ok(());
    };

    let [r, g, bl, alpha] = triangle.rgba.map(|v| v.clamp(0.0, 1.0));
    let color = sk::Color::from_rgba(r, g, bl, alpha)
        .ok_or_else(|| RenderError::Backend(format!("invalid colour {:?}", triangle.rgba)))?;

    let mut paint = sk::Paint::default();
    paint.set_color(color);
    paint.anti_alias = false;

    pix.fill_path(
        &path,
        &paint,
        sk::FillRule::Winding,
        sk::Transform::identity(),
        None,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Vertex;

    #[test]
    fn test_opaque_cover() {
        let genome = Genome::new(vec![Triangle::new(
            [
                Vertex::new(0.0, 0.0),
                Vertex::new(2.0, 0.0),
                Vertex::new(0.0, 2.0),
            ],
            [1.0, 0.0, 0.0, 1.0],
        )]);
        let buf = SkiaRenderer::default().render(&genome, 4, 4).unwrap();
        assert_eq!(buf.len(), 4 * 4 * 3);
        assert!(buf.chunks(3).all(|px| px == [255, 0, 0]));
    }
}
