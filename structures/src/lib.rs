use std::collections::BTreeMap;
use std::num::NonZeroU16;

use serde::{de, Deserialize, Deserializer};

#[macro_use]
extern crate serde_derive;

pub const DEFAULT_BOARD_SIZE: u16 = 120;
/// Largest accepted width or height. A full board is held in memory as RGBA.
pub const MAX_BOARD_SIZE: u16 = 4096;

/// Persisted user configuration. Every key is always present when
/// serialized; keys missing from a stored object are filled from defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "board_size")]
    pub width: NonZeroU16,
    #[serde(deserialize_with = "board_size")]
    pub height: NonZeroU16,
    pub colors: ColorsSetting,
    #[serde(rename = "streamID")]
    pub stream_id: String,
    #[serde(rename = "commentSocketURL")]
    pub comment_socket_url: String,
    #[serde(rename = "importantUsers")]
    pub important_users: Vec<String>,
}

impl Settings {
    pub fn is_important_user(&self, author: &str) -> bool {
        self.important_users.iter().any(|user| user == author)
    }
}

impl Default for Settings {
    fn default() -> Self {
        let size = NonZeroU16::new(DEFAULT_BOARD_SIZE).unwrap_or(NonZeroU16::MIN);

        Self {
            width: size,
            height: size,
            colors: ColorsSetting::default(),
            stream_id: String::new(),
            comment_socket_url: String::new(),
            important_users: Vec::new(),
        }
    }
}

fn board_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NonZeroU16, D::Error> {
    let size = NonZeroU16::deserialize(deserializer)?;

    if size.get() > MAX_BOARD_SIZE {
        return Err(de::Error::custom(format!(
            "board size {} is larger than {}",
            size, MAX_BOARD_SIZE
        )));
    }

    Ok(size)
}

/// The raw `colors` value. Anything that is neither a list of names nor a
/// name -> color object is kept as-is so it survives a save, but it never
/// resolves to a color.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ColorsSetting {
    Names(Vec<String>),
    Palette(BTreeMap<String, String>),
    Other(serde_json::Value),
}

impl Default for ColorsSetting {
    fn default() -> Self {
        let palette = [
            ("white", "#FFFFFF"),
            ("gray", "#E4E4E4"),
            ("darkgray", "#888888"),
            ("black", "#222222"),
            ("pink", "#FFA7D1"),
            ("red", "#E50000"),
            ("orange", "#E59500"),
            ("brown", "#A06A42"),
            ("yellow", "#E5D900"),
            ("lime", "#94E044"),
            ("green", "#02BE01"),
            ("teal", "#00D3DD"),
            ("skyblue", "#0083C7"),
            ("blue", "#0000EA"),
            ("lavender", "#CF6EE4"),
            ("purple", "#820080"),
        ];

        ColorsSetting::Palette(
            palette
                .iter()
                .map(|(name, color)| (name.to_string(), color.to_string()))
                .collect(),
        )
    }
}

/// A single pixel request pulled out of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementCommand {
    pub x: i64,
    pub y: i64,
    pub color_token: String,
    pub author: String,
}

pub const NEW_COMMENT_TYPE: &str = "new_comment";

/// Envelope of every frame sent over the live comments socket.
#[derive(Debug, Deserialize, Serialize)]
pub struct FeedEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
}
