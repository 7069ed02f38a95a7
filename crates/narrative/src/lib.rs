//! Transport-free model of the AI narrative/video collaborators.
//!
//! The web app owns the actual HTTP calls; this crate holds everything that
//! can be tested natively: the response schema, the error taxonomy, the
//! prompt builders, and the long-running video operation poll model.

pub mod error;
pub mod prompts;
pub mod types;
pub mod video;

pub use error::*;
pub use prompts::*;
pub use types::*;
pub use video::*;
