use bytemuck::{Pod, Zeroable};

/// Per-draw uniform block for the ray-cast quad shader. Layout matches the
/// `RayUniforms` struct in `shaders/raycast.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RayUniforms {
    /// Fused rotation times inverse projection, column-major.
    pub ray_matrix: [f32; 16],
    /// 0.0 for the left eye, 1.0 for the right.
    pub eye: f32,
    /// 0.0 equirect mono, 1.0 top/bottom stereo-packed.
    pub mode: f32,
    pub _padding: [f32; 2],
}

impl RayUniforms {
    pub fn new(ray_matrix: [f32; 16], eye: f32, mode: f32) -> Self {
        Self {
            ray_matrix,
            eye,
            mode,
            _padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_size_and_alignment() {
        // mat4x4<f32> + vec2 scalars + padding = 80 bytes, 16-byte aligned.
        assert_eq!(std::mem::size_of::<RayUniforms>(), 80);
        assert_eq!(std::mem::size_of::<RayUniforms>() % 16, 0);
    }
}
