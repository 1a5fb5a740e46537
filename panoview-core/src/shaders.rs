/// Embedded WGSL shader source for the ray-cast quad pipeline. Shared by
/// the native backend and the WASM web runtime.

pub const RAYCAST: &str = include_str!("../shaders/raycast.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raycast_shader_entry_points_present() {
        assert!(RAYCAST.contains("fn vs_main"));
        assert!(RAYCAST.contains("fn fs_main"));
        assert!(RAYCAST.contains("struct RayUniforms"));
    }
}
