pub mod core;
pub mod persistence;
pub mod presets;
pub mod server;
pub mod storage;
pub mod thumbnails;

pub use crate::core::TarologueError;
