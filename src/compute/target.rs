//! The immutable target image the population is evolved towards.

use std::path::Path;

/// Errors raised while loading or building a target image.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("Failed to decode target image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Target image is {actual_width}x{actual_height}, canvas is {expected_width}x{expected_height}")]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Pixel buffer has {actual} bytes, {width}x{height} RGB needs {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Target dimensions must be non-zero")]
    Empty,
}

/// Row-major RGB pixels with known dimensions. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TargetImage {
    /// Wrap a raw RGB buffer, checking its length.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::Empty);
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(TargetError::BufferSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-colour image.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self, TargetError> {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::from_raw(width, height, pixels)
    }

    /// Decode an image file (BMP or PNG) and convert it to RGB.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TargetError> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        log::info!(
            "Loaded target {} ({}x{})",
            path.display(),
            width,
            height
        );
        Self::from_raw(width, height, rgb.into_raw())
    }

    /// Decode an image file and require it to match the canvas exactly.
    pub fn load_with_size<P: AsRef<Path>>(
        path: P,
        width: u32,
        height: u32,
    ) -> Result<Self, TargetError> {
        let target = Self::load(path)?;
        target.expect_size(width, height)?;
        Ok(target)
    }

    /// Fail unless the image is exactly `width x height`.
    pub fn expect_size(&self, width: u32, height: u32) -> Result<(), TargetError> {
        if self.width != width || self.height != height {
            return Err(TargetError::DimensionMismatch {
                expected_width: width,
                expected_height: height,
                actual_width: self.width,
                actual_height: self.height,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
