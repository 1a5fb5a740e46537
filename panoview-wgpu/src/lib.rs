//! PanoView WebGPU backend.
//!
//! Owns the wgpu device/surface pair and the ray-cast quad renderer that
//! draws the two per-eye views of the video sphere. Pure GPU plumbing; the
//! per-frame math lives in `panoview-core`.

mod backend;
mod renderer;
mod video_texture;

pub use backend::Backend;
pub use renderer::RayCastRenderer;
pub use video_texture::VideoTexture;
