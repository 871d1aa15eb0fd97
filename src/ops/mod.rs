// ============================================================================
// OPS — shadow kernels and the image-level operations built on them
// ============================================================================
//
//   shadow.rs    — per-pixel shadow kernels
//   dispatch.rs  — rayon parallel map of a kernel over an image
//   filters.rs   — Gaussian blur
//   elevation.rs — padded, blurred, composited elevation shadows

pub mod dispatch;
pub mod elevation;
pub mod filters;
pub mod shadow;
