mod color;
mod constants;
mod errors;
mod history;
mod log_buffer;
pub mod parser;
mod placement;
mod settings_store;
mod storage;

pub use crate::color::ColorSpace;
pub use crate::constants::{is_safe_integer, BOARD_KEY, LOG_CAPACITY, MAX_SAFE_INTEGER, SETTINGS_KEY};
pub use crate::errors::{Rejected, SettingsError, StorageError};
pub use crate::history::HistoryWriter;
pub use crate::log_buffer::{LogBuffer, LogEntry};
pub use crate::placement::{restore_board, MessageOutcome, Placed, PlacementEngine};
pub use crate::settings_store::{SettingKey, SettingsStore};
pub use crate::storage::{FileStorage, MemoryStorage, Storage};
