use glam::Quat;

use panoview_core::engine::EyeView;
use panoview_core::{Eye, PoseSample};

/// Map a browser screen-orientation type to the rotation degrees the tilt
/// correction expects.
pub fn screen_orientation_degrees(kind: &str) -> f64 {
    match kind {
        "landscape-primary" => 90.0,
        "landscape-secondary" => -90.0,
        "portrait-secondary" => 180.0,
        _ => 0.0, // portrait-primary and anything unknown
    }
}

/// Latched phone tilt angles. Each deviceorientation event overwrites the
/// previous one (last write wins, no queue); the render tick reads whatever
/// is latched when it starts.
pub struct TiltLatch {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub screen_orientation: f64,
}

/// Latched headset state: the most recent pose quaternion plus the per-eye
/// view geometry reported by the device.
pub struct HeadsetLatch {
    pub orientation: Option<Quat>,
    pub left: Option<EyeView>,
    pub right: Option<EyeView>,
}

/// The active pose source, decided once at startup. A source that stops
/// delivering data degrades in place; the variant never changes mid-session.
pub enum PoseLatch {
    None,
    Headset(HeadsetLatch),
    PhoneTilt(TiltLatch),
}

impl PoseLatch {
    pub fn none() -> Self {
        PoseLatch::None
    }

    pub fn phone_tilt() -> Self {
        PoseLatch::PhoneTilt(TiltLatch {
            alpha: None,
            beta: None,
            gamma: None,
            screen_orientation: 0.0,
        })
    }

    pub fn headset() -> Self {
        PoseLatch::Headset(HeadsetLatch {
            orientation: None,
            left: None,
            right: None,
        })
    }

    /// Overwrite the latched tilt angles. Ignored unless the tilt source is
    /// active.
    pub fn set_tilt(&mut self, alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) {
        if let PoseLatch::PhoneTilt(tilt) = self {
            tilt.alpha = alpha;
            tilt.beta = beta;
            tilt.gamma = gamma;
        }
    }

    pub fn set_screen_orientation(&mut self, degrees: f64) {
        if let PoseLatch::PhoneTilt(tilt) = self {
            tilt.screen_orientation = degrees;
        }
    }

    /// Overwrite the latched headset pose quaternion.
    pub fn set_headset_orientation(&mut self, orientation: Quat) {
        if let PoseLatch::Headset(headset) = self {
            headset.orientation = Some(orientation);
        }
    }

    /// The headset stopped reporting a pose this session.
    pub fn headset_orientation_lost(&mut self) {
        if let PoseLatch::Headset(headset) = self {
            headset.orientation = None;
        }
    }

    pub fn set_headset_eye(&mut self, eye: Eye, view: EyeView) {
        if let PoseLatch::Headset(headset) = self {
            match eye {
                Eye::Left => headset.left = Some(view),
                Eye::Right => headset.right = Some(view),
            }
        }
    }

    /// Per-eye view geometry, available once the headset has reported both
    /// eyes.
    pub fn headset_view(&self) -> Option<(EyeView, EyeView)> {
        match self {
            PoseLatch::Headset(HeadsetLatch {
                left: Some(left),
                right: Some(right),
                ..
            }) => Some((*left, *right)),
            _ => None,
        }
    }

    /// Snapshot the latched state for this tick's fusion. Pure read.
    pub fn sample(&self) -> PoseSample {
        match self {
            PoseLatch::None => PoseSample::None,
            PoseLatch::Headset(headset) => PoseSample::Headset {
                orientation: headset.orientation,
            },
            PoseLatch::PhoneTilt(tilt) => PoseSample::PhoneTilt {
                alpha: tilt.alpha,
                beta: tilt.beta,
                gamma: tilt.gamma,
                screen_orientation: tilt.screen_orientation,
            },
        }
    }
}
