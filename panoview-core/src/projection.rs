use glam::{Mat4, Quat};
use std::f32::consts::FRAC_PI_2;

/// Field of view as four independent half-angles in degrees, as reported
/// per eye by a headset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeFov {
    pub up_degrees: f32,
    pub down_degrees: f32,
    pub left_degrees: f32,
    pub right_degrees: f32,
}

impl EyeFov {
    /// A symmetric frustum with the same half-angle on all four sides.
    pub fn symmetric(degrees: f32) -> Self {
        Self {
            up_degrees: degrees,
            down_degrees: degrees,
            left_degrees: degrees,
            right_degrees: degrees,
        }
    }
}

/// Which eye a draw belongs to. Left is always rendered first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Scalar handed to the shader to pick the half of a stereo-packed
    /// source texture.
    pub fn selector(self) -> f32 {
        match self {
            Eye::Left => 0.0,
            Eye::Right => 1.0,
        }
    }
}

/// Render-target rectangle in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Split-screen viewport for one eye: left eye takes the left half of the
/// canvas, right eye the rest, full height. The right eye's width absorbs
/// the remainder so the halves always tile the canvas exactly.
pub fn split_viewport(eye: Eye, canvas_width: u32, canvas_height: u32) -> Viewport {
    let half = canvas_width / 2;
    match eye {
        Eye::Left => Viewport {
            x: 0,
            y: 0,
            width: half,
            height: canvas_height,
        },
        Eye::Right => Viewport {
            x: half,
            y: 0,
            width: canvas_width - half,
            height: canvas_height,
        },
    }
}

/// Off-axis perspective matrix from an asymmetric field of view.
///
/// Column-major, right-handed, depth mapped to [0, 1]. Degenerates to the
/// symmetric perspective matrix when all four half-angles are equal.
///
/// Angles outside (0, 180) degrees or a depth range with
/// `z_far <= z_near <= 0` are programming errors and abort.
pub fn perspective_from_fov(fov: &EyeFov, z_near: f32, z_far: f32) -> Mat4 {
    for angle in [
        fov.up_degrees,
        fov.down_degrees,
        fov.left_degrees,
        fov.right_degrees,
    ] {
        assert!(
            angle > 0.0 && angle < 180.0,
            "FOV half-angle out of range: {angle}"
        );
    }
    assert!(
        z_near > 0.0 && z_far > z_near,
        "invalid depth range: near={z_near} far={z_far}"
    );

    let up_tan = fov.up_degrees.to_radians().tan();
    let down_tan = fov.down_degrees.to_radians().tan();
    let left_tan = fov.left_degrees.to_radians().tan();
    let right_tan = fov.right_degrees.to_radians().tan();
    let x_scale = 2.0 / (left_tan + right_tan);
    let y_scale = 2.0 / (up_tan + down_tan);

    let mut m = [0.0_f32; 16];
    m[0] = x_scale;
    m[5] = y_scale;
    m[8] = -(left_tan - right_tan) * x_scale * 0.5;
    m[9] = (up_tan - down_tan) * y_scale * 0.5;
    m[10] = z_far / (z_near - z_far);
    m[11] = -1.0;
    m[14] = z_far * z_near / (z_near - z_far);
    Mat4::from_cols_array(&m)
}

/// Symmetric fallback projection used when no headset is present: vertical
/// FOV of 90° at the given aspect ratio (half canvas width over height).
/// Both eyes receive the same matrix.
pub fn perspective_fallback(aspect_ratio: f32, z_near: f32, z_far: f32) -> Mat4 {
    assert!(
        z_near > 0.0 && z_far > z_near,
        "invalid depth range: near={z_near} far={z_far}"
    );
    Mat4::perspective_rh(FRAC_PI_2, aspect_ratio, z_near, z_far)
}

/// The per-eye matrix handed to the ray-cast shader: the fused rotation
/// premultiplying the inverse projection. The shader pushes each pixel's
/// clip-space position through this to reconstruct a world-space view ray.
pub fn ray_matrix(rotation: Quat, projection: &Mat4) -> Mat4 {
    Mat4::from_quat(rotation) * projection.inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn mat4_approx_eq(a: &Mat4, b: &Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| approx_eq(*x, *y))
    }

    // ── perspective_from_fov ──

    #[test]
    fn test_symmetric_fov_matches_standard_perspective() {
        // Four equal 45° half-angles are a 90° vertical FOV at aspect 1.
        let asym = perspective_from_fov(&EyeFov::symmetric(45.0), 0.1, 10.0);
        let sym = perspective_fallback(1.0, 0.1, 10.0);
        assert!(mat4_approx_eq(&asym, &sym));
    }

    #[test]
    fn test_asymmetric_fov_off_axis_terms() {
        let fov = EyeFov {
            up_degrees: 50.0,
            down_degrees: 40.0,
            left_degrees: 55.0,
            right_degrees: 35.0,
        };
        let m = perspective_from_fov(&fov, 0.1, 10.0).to_cols_array();
        let left_tan = 55.0_f32.to_radians().tan();
        let right_tan = 35.0_f32.to_radians().tan();
        let up_tan = 50.0_f32.to_radians().tan();
        let down_tan = 40.0_f32.to_radians().tan();
        assert!(approx_eq(m[0], 2.0 / (left_tan + right_tan)));
        assert!(approx_eq(m[5], 2.0 / (up_tan + down_tan)));
        assert!(approx_eq(
            m[8],
            -(left_tan - right_tan) / (left_tan + right_tan)
        ));
        assert!(approx_eq(m[9], (up_tan - down_tan) / (up_tan + down_tan)));
        assert!(approx_eq(m[11], -1.0));
    }

    #[test]
    #[should_panic]
    fn test_zero_angle_is_fatal() {
        let _ = perspective_from_fov(
            &EyeFov {
                up_degrees: 0.0,
                down_degrees: 45.0,
                left_degrees: 45.0,
                right_degrees: 45.0,
            },
            0.1,
            10.0,
        );
    }

    #[test]
    #[should_panic]
    fn test_inverted_depth_range_is_fatal() {
        let _ = perspective_from_fov(&EyeFov::symmetric(45.0), 10.0, 0.1);
    }

    // ── split_viewport ──

    #[test]
    fn test_split_viewport_halves() {
        let left = split_viewport(Eye::Left, 800, 600);
        let right = split_viewport(Eye::Right, 800, 600);
        assert_eq!(
            left,
            Viewport {
                x: 0,
                y: 0,
                width: 400,
                height: 600
            }
        );
        assert_eq!(
            right,
            Viewport {
                x: 400,
                y: 0,
                width: 400,
                height: 600
            }
        );
    }

    #[test]
    fn test_split_viewport_tiles_exactly() {
        for width in [2u32, 640, 799, 800, 801, 1921] {
            let left = split_viewport(Eye::Left, width, 100);
            let right = split_viewport(Eye::Right, width, 100);
            assert_eq!(left.width + right.width, width);
            assert_eq!(left.x + left.width, right.x);
        }
    }

    // ── ray_matrix ──

    #[test]
    fn test_ray_matrix_identity_rotation_is_inverse_projection() {
        let proj = perspective_fallback(1.5, 0.1, 10.0);
        let ray = ray_matrix(Quat::IDENTITY, &proj);
        assert!(mat4_approx_eq(&ray, &proj.inverse()));
    }

    #[test]
    fn test_ray_matrix_applies_rotation_after_unprojection() {
        let proj = perspective_fallback(1.0, 0.1, 10.0);
        let rot = Quat::from_rotation_y(0.6);
        let ray = ray_matrix(rot, &proj);
        let expected = Mat4::from_quat(rot) * proj.inverse();
        assert!(mat4_approx_eq(&ray, &expected));
    }
}
