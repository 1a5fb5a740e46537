use glam::{Quat, Vec3};

/// Latest-known pose data for the active pose source, read once per tick.
///
/// Exactly one variant is active for a whole session; a source that stops
/// delivering data degrades to the manual-only path without changing variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseSample {
    /// No headset and no tilt sensor — manual rotation only.
    None,
    /// Headset pose sensor. `None` or an all-zero quaternion means the
    /// sensor had no data this tick (all-zero is the hardware sentinel).
    Headset { orientation: Option<Quat> },
    /// Phone tilt sensor. Angles are in degrees as delivered by the device;
    /// any `None` component means the sensor has not fired yet.
    PhoneTilt {
        alpha: Option<f64>,
        beta: Option<f64>,
        gamma: Option<f64>,
        /// Current screen rotation: 0, 90, 180, or -90 degrees.
        screen_orientation: f64,
    },
}

/// Free-look orientation state: the manual rotation accumulator and the
/// signed angular rate driven by key edges.
///
/// `manual_rotation` persists across frames and is only reset on video load
/// or an explicit recenter. `manual_rate` is mutated by discrete key up/down
/// edges, never by rendering code.
pub struct OrientationState {
    manual_rotation: Quat,
    manual_rate: Vec3,
}

impl OrientationState {
    pub fn new() -> Self {
        Self {
            manual_rotation: Quat::IDENTITY,
            manual_rate: Vec3::ZERO,
        }
    }

    pub fn manual_rotation(&self) -> Quat {
        self.manual_rotation
    }

    pub fn manual_rate(&self) -> Vec3 {
        self.manual_rate
    }

    /// Replace the manual angular rate. Called from the key-edge input
    /// adapter only.
    pub fn set_manual_rate(&mut self, rate: Vec3) {
        self.manual_rate = rate;
    }

    /// Advance the manual rotation by `dt` seconds of the current rate.
    ///
    /// The increment quaternion is `normalize(rate * dt, 1.0)`, a
    /// small-angle approximation of the exponential map. It diverges from
    /// true axis-angle integration as `dt` grows; callers keep `dt` at
    /// per-frame scale.
    pub fn integrate(&mut self, dt_seconds: f32) {
        let increment = Quat::from_xyzw(
            self.manual_rate.x * dt_seconds,
            self.manual_rate.y * dt_seconds,
            self.manual_rate.z * dt_seconds,
            1.0,
        )
        .normalize();
        self.manual_rotation = (self.manual_rotation * increment).normalize();
    }

    /// Combine the manual rotation with the latest pose sample into the
    /// single rotation used for rendering. Pure read; mutates nothing.
    pub fn fuse(&self, pose: &PoseSample) -> Quat {
        let fused = match pose {
            PoseSample::Headset {
                orientation: Some(sensor),
            } if *sensor != Quat::from_xyzw(0.0, 0.0, 0.0, 0.0) => {
                self.manual_rotation * *sensor
            }
            PoseSample::PhoneTilt {
                alpha: Some(alpha),
                beta: Some(beta),
                gamma: Some(gamma),
                screen_orientation,
            } => self.manual_rotation * device_rotation(*alpha, *beta, *gamma, *screen_orientation),
            // Degraded or absent sensor: manual rotation alone.
            _ => self.manual_rotation,
        };
        fused.normalize()
    }

    /// Recenter the view on the current pose. With a tilt sensor this sets
    /// the manual rotation to the inverse of the device rotation so the
    /// fused result becomes identity; headset zeroing is the sensor
    /// collaborator's job, so anything else resets to identity.
    pub fn recenter(&mut self, pose: &PoseSample) {
        self.manual_rotation = match pose {
            PoseSample::PhoneTilt {
                alpha: Some(alpha),
                beta: Some(beta),
                gamma: Some(gamma),
                screen_orientation,
            } => device_rotation(*alpha, *beta, *gamma, *screen_orientation).inverse(),
            _ => Quat::IDENTITY,
        };
    }

    /// Reset the manual rotation to identity (video load). The manual rate
    /// is left alone; held keys stay held.
    pub fn reset(&mut self) {
        self.manual_rotation = Quat::IDENTITY;
    }
}

impl Default for OrientationState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the rendering rotation for a phone tilt reading.
///
/// The device quaternion uses ZXY Euler composition of the half-angles of
/// beta (X), gamma (Y), and alpha (Z). It is then corrected for the current
/// screen rotation, and finally remapped from the DeviceOrientation
/// East-North-Up convention to GL camera axes (+x right, +y up, +z backward)
/// by a fixed -90° rotation about X. North maps to -z, the default camera
/// direction.
pub fn device_rotation(
    alpha_degrees: f64,
    beta_degrees: f64,
    gamma_degrees: f64,
    screen_orientation_degrees: f64,
) -> Quat {
    let x = (beta_degrees.to_radians() / 2.0) as f32;
    let y = (gamma_degrees.to_radians() / 2.0) as f32;
    let z = (alpha_degrees.to_radians() / 2.0) as f32;
    let (sx, cx) = x.sin_cos();
    let (sy, cy) = y.sin_cos();
    let (sz, cz) = z.sin_cos();

    // ZXY quaternion construction.
    let device = Quat::from_xyzw(
        sx * cy * cz - cx * sy * sz,
        cx * sy * cz + sx * cy * sz,
        cx * cy * sz + sx * sy * cz,
        cx * cy * cz - sx * sy * sz,
    );

    let screen = (screen_orientation_degrees.to_radians() / 2.0) as f32;
    let screen_fix = Quat::from_xyzw(0.0, 0.0, -screen.sin(), screen.cos());

    let r = 0.5_f32.sqrt();
    let axis_fix = Quat::from_xyzw(-r, 0.0, 0.0, r);

    (axis_fix * (device * screen_fix)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn quat_approx_eq(a: Quat, b: Quat) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z) && approx_eq(a.w, b.w)
    }

    // ── integrate ──

    #[test]
    fn test_integrate_preserves_unit_norm() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(1.0, -0.5, 2.0));
        for _ in 0..1000 {
            state.integrate(0.016);
            assert!(approx_eq(state.manual_rotation().length(), 1.0));
        }
    }

    #[test]
    fn test_integrate_zero_rate_is_identity() {
        let mut state = OrientationState::new();
        state.integrate(0.5);
        assert!(quat_approx_eq(state.manual_rotation(), Quat::IDENTITY));
    }

    #[test]
    fn test_integrate_zero_dt_is_noop() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(1.0, 1.0, 1.0));
        state.integrate(0.0);
        assert!(quat_approx_eq(state.manual_rotation(), Quat::IDENTITY));
    }

    #[test]
    fn test_integrate_matches_small_angle_formula() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(0.2, -0.4, 0.1));
        state.integrate(0.016);
        let expected = Quat::from_xyzw(0.2 * 0.016, -0.4 * 0.016, 0.1 * 0.016, 1.0).normalize();
        assert!(quat_approx_eq(state.manual_rotation(), expected));
    }

    // ── fuse ──

    #[test]
    fn test_fuse_none_returns_manual_rotation() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(0.3, 0.7, -0.2));
        state.integrate(0.5);
        let fused = state.fuse(&PoseSample::None);
        assert!(quat_approx_eq(fused, state.manual_rotation()));
    }

    #[test]
    fn test_fuse_headset_composes_manual_then_sensor() {
        let state = OrientationState::new();
        let sensor = Quat::from_rotation_y(0.4);
        let fused = state.fuse(&PoseSample::Headset {
            orientation: Some(sensor),
        });
        assert!(quat_approx_eq(fused, sensor));
    }

    #[test]
    fn test_fuse_headset_all_zero_sentinel_falls_back() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(0.0, 1.0, 0.0));
        state.integrate(0.25);
        let degraded = state.fuse(&PoseSample::Headset {
            orientation: Some(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)),
        });
        let absent = state.fuse(&PoseSample::Headset { orientation: None });
        let none = state.fuse(&PoseSample::None);
        assert!(quat_approx_eq(degraded, none));
        assert!(quat_approx_eq(absent, none));
    }

    #[test]
    fn test_fuse_phone_tilt_incomplete_falls_back() {
        let state = OrientationState::new();
        let fused = state.fuse(&PoseSample::PhoneTilt {
            alpha: Some(30.0),
            beta: None,
            gamma: Some(10.0),
            screen_orientation: 0.0,
        });
        assert!(quat_approx_eq(fused, state.manual_rotation()));
    }

    #[test]
    fn test_fuse_is_unit_norm() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(2.0, 0.0, -1.0));
        state.integrate(0.3);
        let fused = state.fuse(&PoseSample::PhoneTilt {
            alpha: Some(123.0),
            beta: Some(-45.0),
            gamma: Some(60.0),
            screen_orientation: 90.0,
        });
        assert!(approx_eq(fused.length(), 1.0));
    }

    #[test]
    fn test_fuse_does_not_mutate() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(0.5, 0.5, 0.5));
        state.integrate(0.1);
        let before = state.manual_rotation();
        let _ = state.fuse(&PoseSample::Headset {
            orientation: Some(Quat::from_rotation_x(0.7)),
        });
        assert_eq!(before, state.manual_rotation());
    }

    // ── device_rotation ──

    #[test]
    fn test_device_rotation_alpha_90_analytic() {
        // alpha=90, beta=0, gamma=0, screen=0: the ZXY formula gives
        // (0, 0, sqrt(.5), sqrt(.5)); premultiplying the axis fix
        // (-sqrt(.5), 0, 0, sqrt(.5)) yields (-0.5, 0.5, 0.5, 0.5).
        let q = device_rotation(90.0, 0.0, 0.0, 0.0);
        assert!(quat_approx_eq(q, Quat::from_xyzw(-0.5, 0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_device_rotation_identity_tilt_is_axis_fix() {
        let q = device_rotation(0.0, 0.0, 0.0, 0.0);
        let r = 0.5_f32.sqrt();
        assert!(quat_approx_eq(q, Quat::from_xyzw(-r, 0.0, 0.0, r)));
    }

    #[test]
    fn test_fuse_identity_manual_passes_device_rotation_through() {
        let state = OrientationState::new();
        let fused = state.fuse(&PoseSample::PhoneTilt {
            alpha: Some(90.0),
            beta: Some(0.0),
            gamma: Some(0.0),
            screen_orientation: 0.0,
        });
        assert!(quat_approx_eq(fused, Quat::from_xyzw(-0.5, 0.5, 0.5, 0.5)));
    }

    // ── recenter / reset ──

    #[test]
    fn test_recenter_phone_tilt_cancels_device_rotation() {
        let mut state = OrientationState::new();
        let pose = PoseSample::PhoneTilt {
            alpha: Some(40.0),
            beta: Some(-20.0),
            gamma: Some(75.0),
            screen_orientation: 90.0,
        };
        state.recenter(&pose);
        let fused = state.fuse(&pose);
        assert!(quat_approx_eq(fused, Quat::IDENTITY) || quat_approx_eq(fused, -Quat::IDENTITY));
    }

    #[test]
    fn test_reset_clears_rotation_keeps_rate() {
        let mut state = OrientationState::new();
        state.set_manual_rate(Vec3::new(0.0, 1.0, 0.0));
        state.integrate(1.0);
        state.reset();
        assert!(quat_approx_eq(state.manual_rotation(), Quat::IDENTITY));
        assert_eq!(state.manual_rate(), Vec3::new(0.0, 1.0, 0.0));
    }
}
