//! Browser front-end for the animated globe.
//!
//! The host page owns the DOM, the requestAnimationFrame loop, and the HUD;
//! this crate owns the orbit rig, the GPU scene, and the narrative backend
//! calls, exposed as a flat wasm-bindgen surface.

pub mod scene_math;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod wgpu;

#[cfg(target_arch = "wasm32")]
pub use app::*;
