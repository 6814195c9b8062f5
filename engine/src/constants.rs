// Storage keys, one file each when backed by a directory
pub const SETTINGS_KEY: &str = "settings.json";
pub const BOARD_KEY: &str = "board.png";

pub const LOG_CAPACITY: usize = 5;

/// Largest integer that survives a round trip through an f64 (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;

pub fn is_safe_integer(value: i64) -> bool {
    (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value)
}
