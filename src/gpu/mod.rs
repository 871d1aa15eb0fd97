// ============================================================================
// GPU MODULE — compute-shader dispatch of the shadow kernels
// ============================================================================
//
//   context.rs — wgpu Device, Queue, adapter init
//   shaders.rs — WGSL source
//   compute.rs — shadow tint compute pipeline + readback
// ============================================================================

pub mod compute;
pub mod context;
pub mod shaders;

use image::RgbaImage;

pub use compute::GpuShadowPipeline;
pub use context::GpuContext;

use crate::error::ShadowError;
use crate::ops::shadow::DiagonalKernel;

/// A GPU context paired with the shadow tint pipeline.
pub struct GpuShadowRenderer {
    pub ctx: GpuContext,
    pipeline: GpuShadowPipeline,
}

impl GpuShadowRenderer {
    /// `None` when no adapter (hardware or software) is available.
    pub fn new(preferred_gpu: &str) -> Option<Self> {
        let ctx = GpuContext::new(preferred_gpu)?;
        let pipeline = GpuShadowPipeline::new(&ctx.device);
        Some(Self { ctx, pipeline })
    }

    pub fn adapter_name(&self) -> &str {
        &self.ctx.adapter_name
    }

    /// Run `kernel` over every pixel of `src` on the GPU.
    pub fn apply<K: DiagonalKernel + ?Sized>(
        &self,
        kernel: &K,
        src: &RgbaImage,
    ) -> Result<RgbaImage, ShadowError> {
        let (w, h) = src.dimensions();
        let data = self
            .pipeline
            .apply(&self.ctx, src.as_raw(), w, h, kernel.channel_scale())?;
        RgbaImage::from_raw(w, h, data)
            .ok_or_else(|| ShadowError::Gpu("readback size mismatch".to_string()))
    }
}
