//! PanoView WASM Web Runtime
//!
//! Plays a single equirectangular 360° video as a stereo view in the
//! browser. Keyboard, tilt-sensor, and headset inputs are latched here and
//! fused into one rendering rotation per frame by `panoview-core`; drawing
//! goes through the `panoview-wgpu` ray-cast renderer. DOM wiring
//! (play/pause buttons, seek bar, file selection) stays in the host page,
//! which calls into the exported `Player`.

#[cfg(target_arch = "wasm32")]
mod app;
mod input;
mod pose;
mod sizing;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point — called when the WASM module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    log::info!("PanoView web runtime initialized");
}

/// Create a player bound to a canvas and a video element.
///
/// Called from JavaScript once the DOM is ready.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn create_player(canvas_id: String, video_id: String) -> Result<app::Player, JsValue> {
    app::Player::new(&canvas_id, &video_id).await
}
