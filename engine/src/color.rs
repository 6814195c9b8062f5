use std::collections::BTreeMap;

use structures::ColorsSetting;

/// Which color tokens are accepted and what they are painted as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    /// Each token is its own display color.
    FlatSet(Vec<String>),
    /// Token -> display color.
    Palette(BTreeMap<String, String>),
    /// Nothing resolves, placement is effectively disabled.
    Unconfigured,
}

impl ColorSpace {
    pub fn from_setting(setting: &ColorsSetting) -> Self {
        match setting {
            ColorsSetting::Names(names) => ColorSpace::FlatSet(names.clone()),
            ColorsSetting::Palette(palette) => ColorSpace::Palette(palette.clone()),
            ColorsSetting::Other(_) => ColorSpace::Unconfigured,
        }
    }

    /// Looks up the display color for a token. `None` means the token is
    /// rejected.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        match self {
            ColorSpace::FlatSet(names) => names
                .iter()
                .find(|name| name.as_str() == token)
                .map(String::as_str),
            ColorSpace::Palette(palette) => palette
                .get(token)
                .map(String::as_str)
                .filter(|display| !display.is_empty()),
            ColorSpace::Unconfigured => None,
        }
    }

    /// `(name, display color)` pairs for a color legend.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        match self {
            ColorSpace::FlatSet(names) => names
                .iter()
                .map(|name| (name.as_str(), name.as_str()))
                .collect(),
            ColorSpace::Palette(palette) => palette
                .iter()
                .map(|(name, display)| (name.as_str(), display.as_str()))
                .collect(),
            ColorSpace::Unconfigured => Vec::new(),
        }
    }
}
