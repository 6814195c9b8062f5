use std::{fmt, str::FromStr};

use log::{debug, warn};
use serde_json::{Map, Value};
use structures::Settings;

use crate::{
    color::ColorSpace, constants::SETTINGS_KEY, errors::SettingsError, storage::Storage,
};

/// The recognized settings keys, spelled as they appear in the stored JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Width,
    Height,
    Colors,
    StreamId,
    CommentSocketUrl,
    ImportantUsers,
}

impl SettingKey {
    pub const ALL: [SettingKey; 6] = [
        SettingKey::Width,
        SettingKey::Height,
        SettingKey::Colors,
        SettingKey::StreamId,
        SettingKey::CommentSocketUrl,
        SettingKey::ImportantUsers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Width => "width",
            SettingKey::Height => "height",
            SettingKey::Colors => "colors",
            SettingKey::StreamId => "streamID",
            SettingKey::CommentSocketUrl => "commentSocketURL",
            SettingKey::ImportantUsers => "importantUsers",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Settings backed by durable storage. Every successful change writes the
/// whole settings object back, never a partial one.
pub struct SettingsStore<S: Storage> {
    storage: S,
    settings: Settings,
    color_space: ColorSpace,
}

impl<S: Storage> SettingsStore<S> {
    /// Reads the stored settings. Keys missing from the stored object take
    /// their defaults; an object that doesn't decode is dropped entirely.
    pub fn load(storage: S) -> Self {
        let settings = match storage.read(SETTINGS_KEY) {
            Ok(Some(blob)) => match serde_json::from_slice::<Settings>(&blob) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("Saved settings are invalid, reverting to defaults: {}", err);
                    Settings::default()
                }
            },
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!("Could not read saved settings, using defaults: {}", err);
                Settings::default()
            }
        };

        Self {
            color_space: ColorSpace::from_setting(&settings.colors),
            storage,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn color_space(&self) -> &ColorSpace {
        &self.color_space
    }

    pub fn get(&self, key: SettingKey) -> Value {
        self.to_object()
            .remove(key.as_str())
            .unwrap_or(Value::Null)
    }

    /// Replaces one key. The value has to leave the settings decodable,
    /// otherwise nothing changes and nothing is written.
    pub fn set(&mut self, key: SettingKey, value: Value) -> Result<(), SettingsError> {
        let mut object = self.to_object();
        object.insert(key.as_str().to_string(), value);

        let updated = serde_json::from_value(Value::Object(object))
            .map_err(|source| SettingsError::InvalidValue { key, source })?;
        self.replace(updated);

        Ok(())
    }

    /// Applies an edited settings object, as submitted by a settings form.
    /// Recognized keys are set one at a time, so a bad value only loses its
    /// own key. Unknown keys are ignored. Returns how many keys were applied.
    pub fn apply_form(&mut self, submitted: &str) -> Result<usize, SettingsError> {
        let submitted: Value = serde_json::from_str(submitted).map_err(|err| {
            warn!("Invalid JSON in settings input: {}", err);
            SettingsError::InvalidJson(err)
        })?;
        let Value::Object(submitted) = submitted else {
            return Err(SettingsError::NotAnObject);
        };

        let mut applied = 0;
        for (name, value) in submitted {
            let key = match name.parse::<SettingKey>() {
                Ok(key) => key,
                Err(_) => {
                    debug!("Ignoring unknown settings key {:?}", name);
                    continue;
                }
            };

            match self.set(key, value) {
                Ok(()) => applied += 1,
                Err(err) => warn!("Skipping settings key: {}", err),
            }
        }

        Ok(applied)
    }

    fn replace(&mut self, settings: Settings) {
        self.color_space = ColorSpace::from_setting(&settings.colors);
        self.settings = settings;
        self.persist();
    }

    fn persist(&self) {
        let blob = match serde_json::to_vec_pretty(&self.settings) {
            Ok(blob) => blob,
            Err(err) => {
                warn!("Could not encode settings: {}", err);
                return;
            }
        };

        if let Err(err) = self.storage.write(SETTINGS_KEY, &blob) {
            warn!("Could not save settings: {}", err);
        }
    }

    fn to_object(&self) -> Map<String, Value> {
        match serde_json::to_value(&self.settings) {
            Ok(Value::Object(object)) => object,
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use structures::{ColorsSetting, Settings};

    use super::{SettingKey, SettingsStore};
    use crate::{color::ColorSpace, constants::SETTINGS_KEY, storage::MemoryStorage, SettingsError};

    fn stored_settings(storage: &MemoryStorage) -> Settings {
        serde_json::from_slice(&storage.get(SETTINGS_KEY).unwrap()).unwrap()
    }

    #[test]
    fn loads_defaults_without_saved_settings() {
        let store = SettingsStore::load(MemoryStorage::new());

        assert_eq!(store.settings(), &Settings::default());
        assert_eq!(store.get(SettingKey::Width), json!(120));
        assert_eq!(store.get(SettingKey::Colors)["red"], json!("#E50000"));
    }

    #[test]
    fn malformed_saved_settings_fall_back_to_defaults() {
        let storage = MemoryStorage::new();
        storage.insert(SETTINGS_KEY, "{ width: 12, ");

        let store = SettingsStore::load(storage);

        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn wrongly_typed_saved_settings_are_not_merged() {
        let storage = MemoryStorage::new();
        storage.insert(SETTINGS_KEY, r#"{ "width": 10, "height": "tall" }"#);

        let store = SettingsStore::load(storage);

        assert_eq!(store.settings().width.get(), 120);
    }

    #[test]
    fn saved_settings_merge_over_defaults() {
        let storage = MemoryStorage::new();
        storage.insert(SETTINGS_KEY, r#"{ "width": 64, "colors": ["red"] }"#);

        let store = SettingsStore::load(storage);

        assert_eq!(store.settings().width.get(), 64);
        assert_eq!(store.settings().height.get(), 120);
        assert_eq!(
            store.color_space(),
            &ColorSpace::FlatSet(vec!["red".to_string()])
        );
    }

    #[test]
    fn set_persists_full_object() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::load(storage.clone());

        store.set(SettingKey::StreamId, json!("ux3xrq")).unwrap();

        let saved = stored_settings(&storage);
        assert_eq!(saved.stream_id, "ux3xrq");
        assert_eq!(saved.width.get(), 120);
        assert_eq!(saved.colors, ColorsSetting::default());
    }

    #[test]
    fn set_recomputes_color_space() {
        let mut store = SettingsStore::load(MemoryStorage::new());

        store.set(SettingKey::Colors, json!(["red", "blue"])).unwrap();
        assert_eq!(store.color_space().resolve("blue"), Some("blue"));

        store.set(SettingKey::Colors, json!(null)).unwrap();
        assert_eq!(store.color_space(), &ColorSpace::Unconfigured);
    }

    #[test]
    fn invalid_value_changes_nothing() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::load(storage.clone());

        assert!(matches!(
            store.set(SettingKey::Width, json!(-3)),
            Err(SettingsError::InvalidValue {
                key: SettingKey::Width,
                ..
            })
        ));
        assert_eq!(store.settings().width.get(), 120);
        assert_eq!(storage.get(SETTINGS_KEY), None);
    }

    #[test]
    fn oversized_board_is_refused() {
        let storage = MemoryStorage::new();
        storage.insert(SETTINGS_KEY, r#"{ "width": 60000, "height": 60000 }"#);
        let mut store = SettingsStore::load(storage);

        assert_eq!(store.settings().width.get(), 120);
        assert!(matches!(
            store.set(SettingKey::Height, json!(5000)),
            Err(SettingsError::InvalidValue {
                key: SettingKey::Height,
                ..
            })
        ));
        assert_eq!(store.settings().height.get(), 120);
    }

    #[test]
    fn apply_form_ignores_unknown_keys() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::load(storage.clone());

        let applied = store
            .apply_form(r#"{ "importantUsers": ["mod"], "theme": "dark" }"#)
            .unwrap();

        assert_eq!(applied, 1);
        assert_eq!(store.settings().important_users, vec!["mod".to_string()]);
        assert_eq!(stored_settings(&storage).important_users, vec!["mod".to_string()]);
        assert!(!String::from_utf8(storage.get(SETTINGS_KEY).unwrap())
            .unwrap()
            .contains("theme"));
    }

    #[test]
    fn apply_form_applies_key_by_key() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::load(storage.clone());

        let applied = store
            .apply_form(r#"{ "streamID": "abc", "height": 0, "width": "wide" }"#)
            .unwrap();

        assert_eq!(applied, 1);
        assert_eq!(store.settings().stream_id, "abc");
        assert_eq!(store.settings().height.get(), 120);
        assert_eq!(store.settings().width.get(), 120);
        assert_eq!(stored_settings(&storage).stream_id, "abc");
    }

    #[test]
    fn apply_form_rejects_non_objects() {
        let mut store = SettingsStore::load(MemoryStorage::new());

        assert!(matches!(
            store.apply_form("{ not json"),
            Err(SettingsError::InvalidJson(_))
        ));
        assert!(matches!(
            store.apply_form("[1, 2]"),
            Err(SettingsError::NotAnObject)
        ));
        assert_eq!(store.settings(), &Settings::default());
    }

    #[test]
    fn parses_key_names() {
        assert_eq!("streamID".parse::<SettingKey>().unwrap(), SettingKey::StreamId);
        assert_eq!(SettingKey::CommentSocketUrl.to_string(), "commentSocketURL");
        assert!("streamid".parse::<SettingKey>().is_err());
    }
}
