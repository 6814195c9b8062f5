use std::fs;

use board::Rgba;
use engine::{
    FileStorage, HistoryWriter, MessageOutcome, PlacementEngine, Rejected, SettingKey, BOARD_KEY,
    SETTINGS_KEY,
};
use serde_json::json;

fn start(dir: &std::path::Path) -> PlacementEngine<FileStorage> {
    env_logger::try_init().ok();
    PlacementEngine::start(FileStorage::open(dir).unwrap())
}

#[test]
fn message_places_pixel_and_logs_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = start(dir.path());
    let before = engine.log().len();

    let outcome = engine.handle_message("pixel_fan", "12 34 red");

    let MessageOutcome::Placed(placed) = outcome else {
        panic!("expected a placement, got {:?}", outcome);
    };
    assert_eq!((placed.x, placed.y), (12, 34));
    assert_eq!(
        engine.board().get_pixel(12, 34),
        Some(Rgba([0xE5, 0x00, 0x00, 0xFF]))
    );
    assert_eq!(engine.log().len(), before + 1);
    assert!(engine
        .log()
        .lines()
        .last()
        .unwrap()
        .ends_with("placed red pixel at (12, 34)"));
    assert!(dir.path().join(BOARD_KEY).exists());
}

#[test]
fn out_of_bounds_message_is_rejected_silently() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = start(dir.path());
    let before = engine.log().lines();

    assert_eq!(
        engine.handle_message("pixel_fan", "999 5 red"),
        MessageOutcome::Rejected(Rejected::OutOfBounds)
    );
    assert_eq!(engine.log().lines(), before);
    assert!(!dir.path().join(BOARD_KEY).exists());
}

#[test]
fn board_and_settings_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = start(dir.path());
        engine
            .settings_mut()
            .apply_form(r##"{ "width": 16, "height": 8, "colors": { "ink": "#102030" } }"##)
            .unwrap();
        engine.handle_message("a", "1 1 ink");
    }

    let engine = start(dir.path());
    assert_eq!(engine.board().width(), 16);
    assert_eq!(engine.board().height(), 8);
    assert_eq!(
        engine.board().get_pixel(1, 1),
        Some(Rgba([0x10, 0x20, 0x30, 0xFF]))
    );
    assert_eq!(
        engine.settings_store().get(SettingKey::Colors),
        json!({ "ink": "#102030" })
    );
}

#[test]
fn malformed_settings_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(SETTINGS_KEY), "not json at all").unwrap();

    let engine = start(dir.path());

    assert_eq!(engine.settings(), &structures::Settings::default());
}

#[test]
fn placements_are_appended_to_history() {
    let dir = tempfile::tempdir().unwrap();
    let history_path = dir.path().join("history.csv");
    let mut engine =
        start(&dir.path().join("data")).with_history(HistoryWriter::open(&history_path).unwrap());

    engine.handle_message("alice", "3 4 blue");
    engine.handle_message("bob", "500 4 blue");

    let history = fs::read_to_string(&history_path).unwrap();
    let rows: Vec<_> = history.lines().collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1].ends_with(",alice,#0000EA,\"3,4\""));
}

#[test]
fn flat_color_list_paints_any_css_keyword() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = start(dir.path());
    engine
        .settings_mut()
        .set(SettingKey::Colors, json!(["gold", "indigo"]))
        .unwrap();

    assert!(matches!(
        engine.handle_message("a", "1 1 gold"),
        MessageOutcome::Placed(_)
    ));
    assert!(matches!(
        engine.handle_message("b", "2 2 indigo"),
        MessageOutcome::Placed(_)
    ));
    assert_eq!(
        engine.handle_message("c", "3 3 red"),
        MessageOutcome::Rejected(Rejected::UnknownColor)
    );

    assert_eq!(
        engine.board().get_pixel(1, 1),
        Some(Rgba([0xFF, 0xD7, 0x00, 0xFF]))
    );
    assert_eq!(
        engine.board().get_pixel(2, 2),
        Some(Rgba([0x4B, 0x00, 0x82, 0xFF]))
    );
    assert_eq!(engine.log().len(), 3);
}

#[test]
fn settings_form_keeps_valid_keys_when_one_is_bad() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = start(dir.path());
        let applied = engine
            .settings_mut()
            .apply_form(r#"{ "streamID": "abc", "height": 0 }"#)
            .unwrap();
        assert_eq!(applied, 1);
    }

    let engine = start(dir.path());
    assert_eq!(engine.settings().stream_id, "abc");
    assert_eq!(engine.settings().height.get(), 120);
}
