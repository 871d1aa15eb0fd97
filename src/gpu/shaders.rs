// ============================================================================
// GPU SHADERS — WGSL source kept inline
// ============================================================================

/// Shadow tint compute shader.
///
/// One invocation per pixel; the kernel is a diagonal colour matrix
/// (`params.scale`) applied to the normalized input.  Matches the CPU
/// kernels: the storage write quantizes back to RGBA8.
pub const SHADOW_TINT_SHADER: &str = r#"
struct TintParams {
    width:  u32,
    height: u32,
    _pad0:  u32,
    _pad1:  u32,
    scale:  vec4<f32>,
};

@group(0) @binding(0) var input_tex:  texture_2d<f32>;
@group(0) @binding(1) var output_tex: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(2) var<uniform> params: TintParams;

@compute @workgroup_size(16, 16)
fn cs_shadow_tint(@builtin(global_invocation_id) gid: vec3<u32>) {
    if (gid.x >= params.width || gid.y >= params.height) { return; }

    let px = textureLoad(input_tex, vec2<u32>(gid.x, gid.y), 0);
    let out = clamp(px * params.scale, vec4<f32>(0.0), vec4<f32>(1.0));
    textureStore(output_tex, vec2<u32>(gid.x, gid.y), out);
}
"#;
