use glam::{Mat4, Quat};

use crate::orientation::{OrientationState, PoseSample};
use crate::projection::{
    perspective_fallback, perspective_from_fov, ray_matrix, split_viewport, Eye, EyeFov, Viewport,
};

/// Near plane for the video sphere frustum.
pub const Z_NEAR: f32 = 0.1;
/// Far plane for the video sphere frustum.
pub const Z_FAR: f32 = 10.0;

/// How the source video packs its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Mono equirectangular frame.
    Equirect = 0,
    /// Top/bottom stereo-packed equirectangular frame.
    Equirect3d = 1,
}

impl ProjectionMode {
    /// Scalar form handed to the shader.
    pub fn as_uniform(self) -> f32 {
        self as i32 as f32
    }
}

/// One eye's view as reported by a headset: field of view plus the
/// recommended render-target rectangle.
#[derive(Debug, Clone, Copy)]
pub struct EyeView {
    pub fov: EyeFov,
    pub viewport: Viewport,
}

/// Where the two eyes go this frame.
#[derive(Debug, Clone, Copy)]
pub enum StereoView {
    /// No headset: split the canvas down the middle, symmetric projection.
    SplitScreen { width: u32, height: u32 },
    /// Headset present: per-eye FOV and render rectangles from the device.
    Headset { left: EyeView, right: EyeView },
}

/// Everything the renderer needs for one eye's draw.
#[derive(Debug, Clone, Copy)]
pub struct EyePass {
    pub eye: Eye,
    pub viewport: Viewport,
    pub projection: Mat4,
    pub rotation: Quat,
    pub ray_matrix: Mat4,
}

/// The per-frame driver: owns the orientation state and the previous frame
/// timestamp, and turns a tick into the two per-eye draw parameter sets.
///
/// `tick` is the only place the manual rotation advances; the first tick
/// after construction integrates nothing.
pub struct Engine {
    orientation: OrientationState,
    projection_mode: ProjectionMode,
    prev_frame_time: Option<f64>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            orientation: OrientationState::new(),
            projection_mode: ProjectionMode::Equirect,
            prev_frame_time: None,
        }
    }

    pub fn orientation(&self) -> &OrientationState {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut OrientationState {
        &mut self.orientation
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        self.projection_mode = mode;
    }

    /// Reset for a new video: manual rotation back to identity. The frame
    /// clock is kept so a later resume only sees real wall-clock elapsed
    /// time.
    pub fn on_video_change(&mut self) {
        self.orientation.reset();
    }

    /// Recenter the view on the current pose sample.
    pub fn recenter(&mut self, pose: &PoseSample) {
        self.orientation.recenter(pose);
    }

    /// Advance one frame: integrate the manual rate over the elapsed time,
    /// fuse with the pose sample, and build both eye passes, left first.
    pub fn tick(
        &mut self,
        frame_time_ms: f64,
        view: &StereoView,
        pose: &PoseSample,
    ) -> [EyePass; 2] {
        if let Some(prev) = self.prev_frame_time {
            let elapsed_seconds = ((frame_time_ms - prev) * 0.001) as f32;
            self.orientation.integrate(elapsed_seconds);
        }
        self.prev_frame_time = Some(frame_time_ms);

        let rotation = self.orientation.fuse(pose);
        [
            self.eye_pass(Eye::Left, view, rotation),
            self.eye_pass(Eye::Right, view, rotation),
        ]
    }

    fn eye_pass(&self, eye: Eye, view: &StereoView, rotation: Quat) -> EyePass {
        let (projection, viewport) = match view {
            StereoView::SplitScreen { width, height } => {
                let aspect = (*width as f32 / 2.0) / *height as f32;
                (
                    perspective_fallback(aspect, Z_NEAR, Z_FAR),
                    split_viewport(eye, *width, *height),
                )
            }
            StereoView::Headset { left, right } => {
                let eye_view = match eye {
                    Eye::Left => left,
                    Eye::Right => right,
                };
                (
                    perspective_from_fov(&eye_view.fov, Z_NEAR, Z_FAR),
                    eye_view.viewport,
                )
            }
        };
        EyePass {
            eye,
            viewport,
            projection,
            rotation,
            ray_matrix: ray_matrix(rotation, &projection),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
