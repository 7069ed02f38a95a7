pub mod angle;
pub mod ease;
pub mod vec;

pub use angle::*;
pub use ease::*;
pub use vec::*;
