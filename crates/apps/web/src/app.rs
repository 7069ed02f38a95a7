use std::cell::RefCell;

use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

use narrative::{
    CountryNarrative, NarrativeError, POLL_INTERVAL_MS, ProgressStages, cinematic_prompt,
    classify_message, narrative_prompt, parse_narrative, parse_operation,
};
use orbit::{ModeFlags, OrbitRig};

use crate::scene_math::{self, CLOUD_DRIFT_RAD_PER_S};
use crate::wgpu::{WgpuContext, init_wgpu_from_canvas_id, resize_wgpu};

struct AppState {
    rig: OrbitRig,
    wgpu: Option<WgpuContext>,
    canvas_width: f64,
    canvas_height: f64,
    /// Wall-clock time of the previous frame; None until the first frame.
    last_frame_ms: Option<f64>,
    /// Decorative cloud-shell spin, independent of the rig.
    cloud_angle_rad: f64,
    narrative_endpoint: String,
    country: Option<CountryNarrative>,
}

thread_local! {
    static STATE: RefCell<AppState> = RefCell::new(AppState {
        rig: OrbitRig::new(ModeFlags::default(), 0.0),
        wgpu: None,
        canvas_width: 1280.0,
        canvas_height: 720.0,
        last_frame_ms: None,
        cloud_angle_rad: 0.0,
        narrative_endpoint: String::new(),
        country: None,
    });
}

/// Safe TLS access helper that returns a default on teardown instead of panicking.
/// JS callbacks can still fire briefly during hot reload.
fn with_state<F, R>(f: F) -> R
where
    F: FnOnce(&RefCell<AppState>) -> R,
    R: Default,
{
    STATE.try_with(f).unwrap_or_default()
}

fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Yield to the browser event loop for `ms` milliseconds.
async fn sleep_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    });
    let _ = JsFuture::from(promise).await;
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// Mount the globe on the given canvas. The mode flags decide the opening
/// camera distance: a reveal starts far out and flies in on its own.
#[wasm_bindgen]
pub fn init_globe(canvas_id: String, cinematic: bool, revealing: bool) {
    let flags = ModeFlags {
        cinematic,
        revealing,
    };
    with_state(|state_ref| {
        let mut s = state_ref.borrow_mut();
        s.rig = OrbitRig::new(flags, now_ms());
        s.cloud_angle_rad = 0.0;
        s.last_frame_ms = None;
        s.country = None;
    });

    spawn_local(async move {
        match init_wgpu_from_canvas_id(&canvas_id).await {
            Ok(ctx) => with_state(|state_ref| {
                let mut s = state_ref.borrow_mut();
                s.canvas_width = ctx.config.width as f64;
                s.canvas_height = ctx.config.height as f64;
                s.wgpu = Some(ctx);
            }),
            Err(err) => web_sys::console::error_1(&err),
        }
    });
}

#[wasm_bindgen]
pub fn set_canvas_sizes(width: u32, height: u32) {
    with_state(|state_ref| {
        let mut s = state_ref.borrow_mut();
        if !s.rig.is_alive() {
            return;
        }
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        if s.canvas_width == w && s.canvas_height == h {
            return;
        }
        s.canvas_width = w;
        s.canvas_height = h;
        if let Some(ctx) = s.wgpu.as_mut() {
            resize_wgpu(ctx, width.max(1), height.max(1));
        }
    });
}

/// One animation step, driven by the host's requestAnimationFrame callback.
/// Uses wall-clock dt so tab throttling cannot spiral the simulation.
#[wasm_bindgen]
pub fn advance_frame() -> Result<(), JsValue> {
    let now = now_ms();
    with_state(|state_ref| {
        let mut s = state_ref.borrow_mut();
        if !s.rig.is_alive() {
            return;
        }
        let dt_s = match s.last_frame_ms {
            Some(prev) => ((now - prev) / 1000.0).clamp(0.001, 0.1),
            None => foundation::time::REF_DT_S,
        };
        s.last_frame_ms = Some(now);
        if s.rig.advance(now, dt_s).is_some() {
            s.cloud_angle_rad += CLOUD_DRIFT_RAD_PER_S * dt_s;
        }
    });
    render_frame()
}

fn render_frame() -> Result<(), JsValue> {
    let _ = STATE.try_with(|state_ref| {
        let s = state_ref.borrow();
        if let Some(ctx) = &s.wgpu {
            let matrices = scene_math::scene_matrices(
                s.rig.rotation(),
                s.rig.distance(),
                s.cloud_angle_rad,
                s.canvas_width,
                s.canvas_height,
            );
            let _ = crate::wgpu::render_scene(ctx, &matrices);
        }
    });
    Ok(())
}

#[wasm_bindgen]
pub fn pointer_down(x_px: f64, y_px: f64) {
    with_state(|state_ref| state_ref.borrow_mut().rig.pointer_down(x_px, y_px));
}

#[wasm_bindgen]
pub fn pointer_move(x_px: f64, y_px: f64) {
    with_state(|state_ref| state_ref.borrow_mut().rig.pointer_move(x_px, y_px));
}

#[wasm_bindgen]
pub fn pointer_up() {
    with_state(|state_ref| state_ref.borrow_mut().rig.pointer_up());
}

#[wasm_bindgen]
pub fn pointer_leave() {
    with_state(|state_ref| state_ref.borrow_mut().rig.pointer_leave());
}

/// Fly the globe to a coordinate. Ignored while the user is mid-drag; the
/// host is expected to resend once its own interaction settles.
#[wasm_bindgen]
pub fn set_target_coordinates(lon_deg: f64, lat_deg: f64) {
    with_state(|state_ref| {
        state_ref
            .borrow_mut()
            .rig
            .set_target_coordinates(lon_deg, lat_deg)
    });
}

#[wasm_bindgen]
pub fn clear_target() {
    with_state(|state_ref| state_ref.borrow_mut().rig.clear_target());
}

#[wasm_bindgen]
pub fn set_mode_flags(cinematic: bool, revealing: bool) {
    let flags = ModeFlags {
        cinematic,
        revealing,
    };
    with_state(|state_ref| state_ref.borrow_mut().rig.set_mode_flags(flags, now_ms()));
}

#[wasm_bindgen]
pub fn get_hud_latitude_deg() -> f64 {
    with_state(|state_ref| state_ref.borrow().rig.telemetry().lat_deg)
}

#[wasm_bindgen]
pub fn get_hud_longitude_deg() -> f64 {
    with_state(|state_ref| state_ref.borrow().rig.telemetry().lon_deg)
}

#[wasm_bindgen]
pub fn get_hud_altitude_km() -> f64 {
    with_state(|state_ref| state_ref.borrow().rig.telemetry().altitude_km)
}

#[wasm_bindgen]
pub fn get_orbit_debug() -> String {
    with_state(|state_ref| {
        let s = state_ref.borrow();
        format!(
            "{} clouds={:.3}rad",
            s.rig.debug_info(),
            s.cloud_angle_rad
        )
    })
}

/// Replace the globe's surface map with RGBA8 pixels decoded by the host.
/// Returns false if the dimensions do not match the pixel slice.
#[wasm_bindgen]
pub fn upload_surface_texture(width: u32, height: u32, pixels: &[u8]) -> bool {
    with_state(|state_ref| {
        let mut s = state_ref.borrow_mut();
        match s.wgpu.as_mut() {
            Some(ctx) => crate::wgpu::upload_surface_texture(ctx, width, height, pixels),
            None => false,
        }
    })
}

/// Tear the globe down. Every mutation and frame advance after this is a
/// no-op, so stray RAF callbacks from the host are harmless.
#[wasm_bindgen]
pub fn shutdown() {
    with_state(|state_ref| {
        let mut s = state_ref.borrow_mut();
        s.rig.shutdown();
        s.wgpu = None;
    });
}

#[wasm_bindgen]
pub fn set_narrative_endpoint(url: String) {
    with_state(|state_ref| state_ref.borrow_mut().narrative_endpoint = url);
}

async fn post_json(url: &str, body: serde_json::Value) -> Result<String, NarrativeError> {
    let resp = Request::post(url)
        .json(&body)
        .map_err(|e| NarrativeError::Transient(e.to_string()))?
        .send()
        .await
        .map_err(|e| classify_message(&e.to_string()))?;
    if resp.status() == 404 {
        return Err(NarrativeError::NotFound);
    }
    if !resp.ok() {
        let text = resp.text().await.unwrap_or_default();
        return Err(classify_message(&text));
    }
    resp.text()
        .await
        .map_err(|e| NarrativeError::Transient(e.to_string()))
}

async fn get_text(url: &str) -> Result<String, NarrativeError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| classify_message(&e.to_string()))?;
    if resp.status() == 404 {
        return Err(NarrativeError::NotFound);
    }
    if !resp.ok() {
        let text = resp.text().await.unwrap_or_default();
        return Err(classify_message(&text));
    }
    resp.text()
        .await
        .map_err(|e| NarrativeError::Transient(e.to_string()))
}

async fn get_bytes(url: &str) -> Result<Vec<u8>, NarrativeError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| classify_message(&e.to_string()))?;
    if !resp.ok() {
        return Err(NarrativeError::Transient(format!(
            "download failed with status {}",
            resp.status()
        )));
    }
    resp.binary()
        .await
        .map_err(|e| NarrativeError::Transient(e.to_string()))
}

fn blob_url_from_bytes(bytes: &[u8]) -> Result<String, JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::of1(&array.into());
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("video/mp4");
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    web_sys::Url::create_object_url_with_blob(&blob)
}

fn endpoint() -> String {
    with_state(|state_ref| state_ref.borrow().narrative_endpoint.clone())
}

async fn fetch_country_narrative(
    endpoint: &str,
    country: &str,
) -> Result<CountryNarrative, NarrativeError> {
    if endpoint.is_empty() {
        return Err(NarrativeError::Transient(
            "narrative endpoint not configured".to_string(),
        ));
    }
    let body = serde_json::json!({
        "country": country,
        "prompt": narrative_prompt(country),
    });
    let text = post_json(&format!("{endpoint}/narrative"), body).await?;
    parse_narrative(&text)
}

/// Fetch a country's story and fly the globe to it. `on_done` receives
/// `(error_message | null, narrative_json | null)`.
#[wasm_bindgen]
pub fn load_country(country: String, on_done: js_sys::Function) {
    spawn_local(async move {
        let base = endpoint();
        match fetch_country_narrative(&base, &country).await {
            Ok(n) => {
                let payload = serde_json::to_string(&n).unwrap_or_default();
                let (lon, lat) = (n.longitude_deg(), n.latitude_deg());
                with_state(|state_ref| {
                    let mut s = state_ref.borrow_mut();
                    s.rig.set_target_coordinates(lon, lat);
                    s.country = Some(n);
                });
                let _ = on_done.call2(&JsValue::NULL, &JsValue::NULL, &JsValue::from_str(&payload));
            }
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
                let _ = on_done.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(&err.to_string()),
                    &JsValue::NULL,
                );
            }
        }
    });
}

async fn run_video_generation(
    endpoint: &str,
    country: &str,
    landscape: &str,
    on_progress: &js_sys::Function,
    stages: &mut ProgressStages,
) -> Result<String, NarrativeError> {
    if endpoint.is_empty() {
        return Err(NarrativeError::Transient(
            "narrative endpoint not configured".to_string(),
        ));
    }

    let body = serde_json::json!({
        "country": country,
        "prompt": cinematic_prompt(country, landscape),
    });
    let text = post_json(&format!("{endpoint}/video"), body).await?;
    let mut op = parse_operation(&text)?;

    // Stage 1 fires after the create call regardless of how fast the
    // operation finishes; later stages accompany each poll.
    let _ = on_progress.call1(
        &JsValue::NULL,
        &JsValue::from_str(&stages.next_message(country)),
    );

    while !op.done {
        let _ = on_progress.call1(
            &JsValue::NULL,
            &JsValue::from_str(&stages.next_message(country)),
        );
        sleep_ms(POLL_INTERVAL_MS as i32).await;

        let name = op
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                NarrativeError::Transient("pending operation has no name to poll".to_string())
            })?;
        let text = get_text(&format!("{endpoint}/video/{name}")).await?;
        op = parse_operation(&text)?;
    }

    let uri = op.download_uri()?;
    let bytes = get_bytes(uri).await?;
    blob_url_from_bytes(&bytes).map_err(|e| NarrativeError::Transient(format!("{e:?}")))
}

/// Kick off cinematic video generation for a country. `on_progress` receives
/// staged status strings on each poll; `on_done` receives
/// `(error_message | null, object_url | null)`.
#[wasm_bindgen]
pub fn generate_cinematic_video(
    country: String,
    landscape: String,
    on_progress: js_sys::Function,
    on_done: js_sys::Function,
) {
    spawn_local(async move {
        let base = endpoint();
        let mut stages = ProgressStages::default();
        let _ = on_progress.call1(
            &JsValue::NULL,
            &JsValue::from_str(&stages.next_message(&country)),
        );
        match run_video_generation(&base, &country, &landscape, &on_progress, &mut stages).await {
            Ok(url) => {
                let _ = on_done.call2(&JsValue::NULL, &JsValue::NULL, &JsValue::from_str(&url));
            }
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
                let _ = on_done.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(&err.to_string()),
                    &JsValue::NULL,
                );
            }
        }
    });
}
