use panoview_core::engine::EyeView;

/// Physical canvas size in device pixels from CSS size and the device
/// pixel ratio. Never collapses to zero; a hidden canvas still gets a
/// one-pixel surface.
pub fn physical_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
    let width = (css_width * device_pixel_ratio).round().max(1.0) as u32;
    let height = (css_height * device_pixel_ratio).round().max(1.0) as u32;
    (width, height)
}

/// Canvas size while presenting to a headset: the two recommended per-eye
/// render rectangles side by side.
pub fn presentation_size(left: &EyeView, right: &EyeView) -> (u32, u32) {
    (
        left.viewport.width + right.viewport.width,
        left.viewport.height.max(right.viewport.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use panoview_core::{EyeFov, Viewport};

    #[test]
    fn test_physical_size_scales_by_pixel_ratio() {
        assert_eq!(physical_size(800.0, 600.0, 1.0), (800, 600));
        assert_eq!(physical_size(800.0, 600.0, 2.0), (1600, 1200));
        assert_eq!(physical_size(799.5, 599.5, 1.0), (800, 600));
    }

    #[test]
    fn test_physical_size_never_zero() {
        assert_eq!(physical_size(0.0, 0.0, 1.0), (1, 1));
    }

    #[test]
    fn test_presentation_size_tiles_eyes() {
        let eye = |x: u32| EyeView {
            fov: EyeFov::symmetric(45.0),
            viewport: Viewport {
                x,
                y: 0,
                width: 960,
                height: 1080,
            },
        };
        assert_eq!(presentation_size(&eye(0), &eye(960)), (1920, 1080));
    }
}
