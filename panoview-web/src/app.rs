use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, HtmlVideoElement};

use glam::Quat;

use panoview_core::engine::{Engine, EyeView, ProjectionMode, StereoView};
use panoview_core::timing::{FrameMarks, FrameTiming};
use panoview_core::{Eye, EyeFov, Viewport};
use panoview_wgpu::{Backend, RayCastRenderer};

use crate::input::ManualRateInput;
use crate::pose::{screen_orientation_degrees, PoseLatch};
use crate::sizing::{physical_size, presentation_size};

// HTMLMediaElement.HAVE_CURRENT_DATA — below this there is no frame to
// upload yet.
const HAVE_CURRENT_DATA: u16 = 2;

struct PlayerState {
    engine: Engine,
    backend: Backend,
    renderer: RayCastRenderer,
    input: ManualRateInput,
    pose: PoseLatch,
    timing: FrameTiming,
    canvas: HtmlCanvasElement,
    video: HtmlVideoElement,
    /// The single outstanding requestAnimationFrame handle. Cleared on
    /// cancellation so two render loops can never run at once.
    frame_handle: Option<i32>,
    running: bool,
    tick_closure: Option<Closure<dyn FnMut(f64)>>,
}

/// The player the host page drives. All DOM controls (buttons, seek bar,
/// file selection) live outside and call in through these methods; sensor
/// and key events are latched here and consumed by the next tick.
#[wasm_bindgen]
pub struct Player {
    state: Rc<RefCell<PlayerState>>,
}

impl Player {
    pub(crate) async fn new(canvas_id: &str, video_id: &str) -> Result<Player, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("Canvas not found")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| "Element is not a canvas")?;
        let video = document
            .get_element_by_id(video_id)
            .ok_or("Video element not found")?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| "Element is not a video")?;

        let (width, height) = physical_size(
            canvas.client_width() as f64,
            canvas.client_height() as f64,
            window.device_pixel_ratio(),
        );
        canvas.set_width(width);
        canvas.set_height(height);

        let backend = Backend::new_canvas(canvas.clone(), width, height)
            .await
            .map_err(|e| JsValue::from_str(&e))?;
        let renderer = RayCastRenderer::new(&backend.device, backend.surface_format());

        log::info!("Player ready: {width}x{height} canvas");

        let state = Rc::new(RefCell::new(PlayerState {
            engine: Engine::new(),
            backend,
            renderer,
            input: ManualRateInput::new(),
            pose: PoseLatch::none(),
            timing: FrameTiming::new(false),
            canvas,
            video,
            frame_handle: None,
            running: false,
            tick_closure: None,
        }));
        install_tick(&state);

        Ok(Player { state })
    }
}

#[wasm_bindgen]
impl Player {
    /// Start the render loop. Idempotent: a loop that is already scheduled
    /// is left alone.
    pub fn play(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.running {
                return;
            }
            state.running = true;
        }
        schedule_next(&self.state);
    }

    /// Stop the render loop, cancelling the pending frame request.
    pub fn pause(&self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        cancel_pending(&mut state);
    }

    /// End of stream: same as pause.
    pub fn ended(&self) {
        self.pause();
    }

    /// A new video source was selected: stop the loop, reset the manual
    /// rotation, and forget the memoized frame so the first new frame
    /// uploads.
    pub fn video_changed(&self) {
        let mut state = self.state.borrow_mut();
        state.running = false;
        cancel_pending(&mut state);
        state.engine.on_video_change();
        state.renderer.invalidate_video();
    }

    pub fn key_down(&self, key: &str) {
        self.state.borrow_mut().input.key_down(key);
    }

    pub fn key_up(&self, key: &str) {
        self.state.borrow_mut().input.key_up(key);
    }

    /// Latch a deviceorientation event. Nulls mean the sensor fired with no
    /// data (desktop browsers do this once).
    pub fn set_tilt(&self, alpha: Option<f64>, beta: Option<f64>, gamma: Option<f64>) {
        self.state.borrow_mut().pose.set_tilt(alpha, beta, gamma);
    }

    /// Latch a screen-orientation change ("portrait-primary" etc.).
    pub fn set_screen_orientation(&self, kind: &str) {
        self.state
            .borrow_mut()
            .pose
            .set_screen_orientation(screen_orientation_degrees(kind));
    }

    /// Declare the pose source for this session. Called once at startup
    /// after the host probes what is available.
    pub fn use_phone_tilt(&self) {
        self.state.borrow_mut().pose = PoseLatch::phone_tilt();
    }

    /// Declare a headset pose source for this session.
    pub fn use_headset(&self) {
        self.state.borrow_mut().pose = PoseLatch::headset();
    }

    /// Latch the headset pose for the next tick.
    pub fn set_headset_orientation(&self, x: f32, y: f32, z: f32, w: f32) {
        self.state
            .borrow_mut()
            .pose
            .set_headset_orientation(Quat::from_xyzw(x, y, z, w));
    }

    /// The headset stopped delivering pose data; fall back to manual-only
    /// rotation until it recovers.
    pub fn headset_orientation_lost(&self) {
        self.state.borrow_mut().pose.headset_orientation_lost();
    }

    /// Latch one eye's field of view and recommended render rectangle
    /// (eye 0 = left, 1 = right; angles in degrees).
    #[allow(clippy::too_many_arguments)]
    pub fn set_headset_eye(
        &self,
        eye: u32,
        up_degrees: f32,
        down_degrees: f32,
        left_degrees: f32,
        right_degrees: f32,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) {
        let eye = if eye == 0 { Eye::Left } else { Eye::Right };
        self.state.borrow_mut().pose.set_headset_eye(
            eye,
            EyeView {
                fov: EyeFov {
                    up_degrees,
                    down_degrees,
                    left_degrees,
                    right_degrees,
                },
                viewport: Viewport {
                    x,
                    y,
                    width,
                    height,
                },
            },
        );
    }

    /// Recenter the view on the current pose ('z' key / recenter button).
    pub fn recenter(&self) {
        let mut state = self.state.borrow_mut();
        let sample = state.pose.sample();
        state.engine.recenter(&sample);
    }

    /// 0 = equirect mono, anything else = top/bottom stereo-packed.
    pub fn set_projection_mode(&self, mode: u32) {
        let mode = if mode == 0 {
            ProjectionMode::Equirect
        } else {
            ProjectionMode::Equirect3d
        };
        self.state.borrow_mut().engine.set_projection_mode(mode);
    }

    /// Toggle slow-frame timing reports in the console.
    pub fn set_show_timing(&self, enabled: bool) {
        self.state.borrow_mut().timing = FrameTiming::new(enabled);
    }
}

impl PlayerState {
    /// One render tick: size the canvas, upload the current video frame,
    /// advance the orientation, draw both eyes.
    fn frame(&mut self, frame_time: f64) {
        let start = now_ms(frame_time);

        // 1. Canvas sizing. Headset presentation wins over CSS sizing; both
        //    paths no-op when dimensions are unchanged.
        let (width, height) = match self.pose.headset_view() {
            Some((left, right)) => presentation_size(&left, &right),
            None => {
                let window = match web_sys::window() {
                    Some(w) => w,
                    None => return,
                };
                physical_size(
                    self.canvas.client_width() as f64,
                    self.canvas.client_height() as f64,
                    window.device_pixel_ratio(),
                )
            }
        };
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
        self.backend.resize(width, height);
        let canvas_resized = now_ms(frame_time);

        // 2. Video frame upload, memoized on the sampling timestamp.
        let video_width = self.video.video_width();
        let video_height = self.video.video_height();
        if self.video.ready_state() >= HAVE_CURRENT_DATA && video_width > 0 {
            self.renderer
                .ensure_video_texture(&self.backend.device, video_width, video_height);
            if let Some(texture) = self.renderer.video_texture_mut() {
                texture.upload_video(&self.backend.queue, &self.video, self.video.current_time());
            }
        } else {
            // No decodable frame this tick; the previous texture stays bound.
            log::debug!("skipping texture upload, video not ready");
        }
        let texture_loaded = now_ms(frame_time);

        // 3. Orientation and per-eye passes.
        self.engine
            .orientation_mut()
            .set_manual_rate(self.input.rate());
        let view = match self.pose.headset_view() {
            Some((left, right)) => StereoView::Headset { left, right },
            None => StereoView::SplitScreen { width, height },
        };
        let sample = self.pose.sample();
        let passes = self.engine.tick(frame_time, &view, &sample);

        // 4. Draw, skipping the frame when the surface is unavailable.
        match self.backend.acquire_frame() {
            Ok(frame) => {
                let target = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.renderer.render(
                    &self.backend.device,
                    &self.backend.queue,
                    &target,
                    &passes,
                    self.engine.projection_mode(),
                );
                frame.present();
            }
            Err(e) => log::error!("dropping frame: {e}"),
        }

        let marks = FrameMarks {
            frame_time,
            start,
            canvas_resized,
            texture_loaded,
            end: now_ms(frame_time),
        };
        if let Some(report) = self.timing.record(&marks) {
            log::debug!("{report}");
        }
    }
}

fn now_ms(fallback: f64) -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(fallback)
}

/// Build the tick closure once. It holds a weak reference so dropping the
/// player tears the loop down.
fn install_tick(state: &Rc<RefCell<PlayerState>>) {
    let weak: Weak<RefCell<PlayerState>> = Rc::downgrade(state);
    let closure = Closure::new(move |frame_time: f64| {
        if let Some(state) = weak.upgrade() {
            {
                let mut s = state.borrow_mut();
                s.frame_handle = None;
                if !s.running {
                    return;
                }
                s.frame(frame_time);
            }
            schedule_next(&state);
        }
    });
    state.borrow_mut().tick_closure = Some(closure);
}

/// Request the next animation frame. At most one request is ever
/// outstanding; a pending handle means a loop is already live.
fn schedule_next(state: &Rc<RefCell<PlayerState>>) {
    let mut s = state.borrow_mut();
    if !s.running || s.frame_handle.is_some() {
        return;
    }
    let id = {
        let closure = s
            .tick_closure
            .as_ref()
            .expect("tick closure installed at construction");
        web_sys::window()
            .expect("No window")
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .expect("requestAnimationFrame failed")
    };
    s.frame_handle = Some(id);
}

fn cancel_pending(state: &mut PlayerState) {
    if let Some(id) = state.frame_handle.take() {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }
}
