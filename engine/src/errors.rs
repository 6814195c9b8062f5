use std::io;

use thiserror::Error;

use crate::settings_store::SettingKey;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read {key}: {source}")]
    Read { key: String, source: io::Error },
    #[error("could not write {key}: {source}")]
    Write { key: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown settings key {0:?}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {source}")]
    InvalidValue {
        key: SettingKey,
        source: serde_json::Error,
    },
    #[error("invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
    #[error("settings must be a JSON object")]
    NotAnObject,
}

/// Why a placement was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("coordinates are not safe integers")]
    InvalidNumber,
    #[error("coordinates are outside the board")]
    OutOfBounds,
    #[error("color is not part of the active color space")]
    UnknownColor,
}
