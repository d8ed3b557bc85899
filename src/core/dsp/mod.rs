//! Digital Signal Processing utilities
//!
//! - `fft` - forward/inverse spectral transform and spectrum frames
//! - `windows` - tapering windows applied before the forward transform
//! - `stats` - mean, deviation and error helpers

pub mod fft;
pub mod stats;
pub mod windows;

pub use fft::{SpectralTransform, SpectrumFrame, INVERSE_RESIDUE_TOLERANCE};
pub use windows::WindowFunction;
