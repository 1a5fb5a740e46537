//! Frame-timing diagnostics. Disabled by default; when enabled, frames whose
//! total wall time exceeds the threshold produce a breakdown report and
//! reset the frames-since-issue counter.

const SLOW_FRAME_MS: f64 = 20.0;

/// Timestamps (milliseconds) collected across one tick, in tick order.
#[derive(Debug, Clone, Copy)]
pub struct FrameMarks {
    /// The scheduler-provided frame timestamp.
    pub frame_time: f64,
    /// When the tick callback actually started running.
    pub start: f64,
    /// After canvas/viewport sizing.
    pub canvas_resized: f64,
    /// After the video texture upload.
    pub texture_loaded: f64,
    /// After both eye draws were issued.
    pub end: f64,
}

pub struct FrameTiming {
    enabled: bool,
    frames_since_issue: u32,
}

impl FrameTiming {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            frames_since_issue: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Record one frame's marks. Returns the slow-frame report when the
    /// frame blew the threshold, `None` otherwise. The caller decides where
    /// the report goes (we log it at debug level from the scheduler).
    pub fn record(&mut self, marks: &FrameMarks) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let total = marks.end - marks.frame_time;
        if total > SLOW_FRAME_MS {
            let report = format!(
                "{} frames since issue; {:.1}ms animation frame lag + {:.1}ms canvas resize + {:.1}ms texture load + {:.1}ms draw = {:.1}ms",
                self.frames_since_issue,
                marks.start - marks.frame_time,
                marks.canvas_resized - marks.start,
                marks.texture_loaded - marks.canvas_resized,
                marks.end - marks.texture_loaded,
                total,
            );
            self.frames_since_issue = 0;
            Some(report)
        } else {
            self.frames_since_issue += 1;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marks(frame_time: f64, end: f64) -> FrameMarks {
        FrameMarks {
            frame_time,
            start: frame_time + 1.0,
            canvas_resized: frame_time + 2.0,
            texture_loaded: frame_time + 3.0,
            end,
        }
    }

    #[test]
    fn test_disabled_reports_nothing() {
        let mut timing = FrameTiming::new(false);
        assert!(timing.record(&marks(0.0, 100.0)).is_none());
    }

    #[test]
    fn test_fast_frames_count_up_silently() {
        let mut timing = FrameTiming::new(true);
        for i in 0..5 {
            assert!(timing.record(&marks(i as f64 * 16.0, i as f64 * 16.0 + 10.0)).is_none());
        }
    }

    #[test]
    fn test_slow_frame_reports_and_resets_counter() {
        let mut timing = FrameTiming::new(true);
        timing.record(&marks(0.0, 10.0));
        timing.record(&marks(16.0, 26.0));
        let report = timing.record(&marks(32.0, 80.0)).expect("slow frame report");
        assert!(report.starts_with("2 frames since issue"));
        // Counter reset: the next slow frame reports zero good frames.
        let report = timing.record(&marks(96.0, 160.0)).expect("slow frame report");
        assert!(report.starts_with("0 frames since issue"));
    }
}
