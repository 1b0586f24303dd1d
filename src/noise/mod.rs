//! Noise generation for terrain synthesis.
//!
//! Uses simdnoise for SIMD-accelerated noise generation.

mod fractal;

pub use fractal::{fractal_field, FractalNoiseConfig};
