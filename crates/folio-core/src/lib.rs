pub mod asset;
pub mod beams;
pub mod clock;
pub mod color;
pub mod config;
pub mod constants;
pub mod fit;
pub mod material;
pub mod progress;
pub mod reveal;
pub mod rig;

pub use asset::*;
pub use beams::*;
pub use clock::*;
pub use color::*;
pub use config::*;
pub use fit::*;
pub use material::*;
pub use progress::*;
pub use reveal::*;
pub use rig::*;
