//! Globe interaction and camera choreography.
//!
//! Everything in this crate is pure, single-threaded state that a render loop
//! advances once per frame. The `rig` module owns one mutable instance of each
//! model and is the only thing a host needs to hold.

pub mod camera;
pub mod mode;
pub mod pointer;
pub mod rig;
pub mod rotation;
pub mod telemetry;

pub use camera::*;
pub use mode::*;
pub use pointer::*;
pub use rig::*;
pub use rotation::*;
pub use telemetry::*;
