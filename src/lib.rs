//! Elevation drop shadows for RGBA images.
//!
//! The core is two per-pixel kernels in [`ops::shadow`]:
//! [`TranslucentShadowFilter`] and [`ShadowAlphaFilter`].  They are mapped
//! over whole images by the rayon dispatcher in [`ops::dispatch`] or by the
//! compute shader in [`gpu`], and [`ops::elevation`] builds padded, blurred
//! drop shadows from them.

pub mod cli;
pub mod error;
pub mod gpu;
pub mod io;
pub mod logger;
pub mod ops;
pub mod pixel;
pub mod settings;

pub use error::ShadowError;
pub use ops::shadow::{DiagonalKernel, PixelKernel, ShadowAlphaFilter, ShadowTint, TranslucentShadowFilter};
pub use pixel::{Color4f, Pixel};
pub use settings::ShadowSettings;
