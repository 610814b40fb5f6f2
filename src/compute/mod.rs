//! Compute module - Rasterization, target image and evolution.

mod render;
#[cfg(feature = "skia")]
mod skia;
mod target;

pub mod evolution;

pub use render::*;
#[cfg(feature = "skia")]
pub use skia::*;
pub use target::*;
