mod board;
mod color;
mod constants;
mod errors;

pub use crate::board::Board;
pub use crate::color::parse_display_color;
pub use crate::constants::SNAPSHOT_FORMAT;
pub use crate::errors::BoardError;
pub use image::Rgba;
