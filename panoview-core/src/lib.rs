//! PanoView core engine.
//!
//! Turns raw orientation inputs (keyboard rates, phone tilt angles, headset
//! pose quaternions) into a single fused rendering rotation per frame, builds
//! per-eye projection matrices from field-of-view data, and produces the
//! draw parameters consumed by the ray-cast quad renderer. Pure math and
//! state only; no GPU or DOM access lives here.

pub mod engine;
pub mod orientation;
pub mod projection;
pub mod shaders;
pub mod timing;
pub mod uniforms;

pub use engine::{Engine, EyePass, EyeView, ProjectionMode, StereoView, Z_FAR, Z_NEAR};
pub use orientation::{OrientationState, PoseSample};
pub use projection::{Eye, EyeFov, Viewport};
pub use uniforms::RayUniforms;
