//! Request handlers.

pub mod health;
pub mod videos;

pub use health::{health, ready};
pub use videos::generate_video;
