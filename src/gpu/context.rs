// ============================================================================
// GPU CONTEXT — headless wgpu Device, Queue, and adapter initialization
// ============================================================================

use std::sync::Arc;

use crate::log_info;

/// Core wgpu resources.  Created once per process; if creation fails the
/// caller stays on the CPU dispatcher.
pub struct GpuContext {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    pub adapter_name: String,
    /// Maximum texture dimension supported by this device.
    pub max_texture_dim: u32,
}

impl GpuContext {
    /// Attempt to create a GPU context.  Tries hardware first, then falls
    /// back to a software rasterizer (`force_fallback_adapter`).
    pub fn new(preferred_gpu: &str) -> Option<Self> {
        if let Some(ctx) = pollster::block_on(Self::new_async(preferred_gpu, false)) {
            return Some(ctx);
        }
        log_info!("[GPU] Hardware adapter unavailable, trying software fallback");
        pollster::block_on(Self::new_async(preferred_gpu, true))
    }

    async fn new_async(preferred_gpu: &str, force_fallback: bool) -> Option<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: power_preference(preferred_gpu),
                compatible_surface: None, // headless: compute only
                force_fallback_adapter: force_fallback,
            })
            .await?;

        let adapter_name = adapter.get_info().name.clone();
        let limits = adapter.limits();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("elevation-shadow GPU"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits {
                        max_texture_dimension_2d: limits.max_texture_dimension_2d,
                        max_compute_workgroup_size_x: limits.max_compute_workgroup_size_x,
                        max_compute_workgroup_size_y: limits.max_compute_workgroup_size_y,
                        max_compute_workgroups_per_dimension: limits
                            .max_compute_workgroups_per_dimension,
                        ..wgpu::Limits::downlevel_defaults()
                    },
                },
                None,
            )
            .await
            .ok()?;

        log_info!(
            "[GPU] Using adapter '{}' (fallback={})",
            adapter_name,
            force_fallback
        );

        Some(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_name,
            max_texture_dim: limits.max_texture_dimension_2d,
        })
    }

    /// Check if a texture of the given dimensions can be created.
    pub fn supports_size(&self, width: u32, height: u32) -> bool {
        width > 0 && height > 0 && width <= self.max_texture_dim && height <= self.max_texture_dim
    }
}

/// Map a settings string to a wgpu power preference.
pub fn power_preference(preferred_gpu: &str) -> wgpu::PowerPreference {
    match preferred_gpu.to_lowercase().as_str() {
        "low power" | "integrated" => wgpu::PowerPreference::LowPower,
        _ => wgpu::PowerPreference::HighPerformance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_preference_names() {
        assert_eq!(power_preference("Integrated"), wgpu::PowerPreference::LowPower);
        assert_eq!(power_preference("low power"), wgpu::PowerPreference::LowPower);
        assert_eq!(power_preference("Auto"), wgpu::PowerPreference::HighPerformance);
    }
}
