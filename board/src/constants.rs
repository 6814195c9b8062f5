use image::{ImageFormat, Rgba};

// Snapshots are PNGs so they can be opened by anything, same as a canvas data URL
pub const SNAPSHOT_FORMAT: ImageFormat = ImageFormat::Png;

// Fully transparent pixels are treated as never placed
pub const UNSET_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);
