use board::{parse_display_color, Board, Rgba};
use chrono::Utc;
use log::{debug, warn};
use structures::Settings;

use crate::{
    constants::{is_safe_integer, BOARD_KEY, LOG_CAPACITY},
    errors::Rejected,
    history::HistoryWriter,
    log_buffer::LogBuffer,
    parser,
    settings_store::SettingsStore,
    storage::Storage,
};

/// A pixel that made it onto the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub x: u32,
    pub y: u32,
    pub color_token: String,
    pub display_color: String,
    pub pixel: Rgba<u8>,
}

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Placed(Placed),
    Rejected(Rejected),
    /// Not a command, but the author is important so it was logged verbatim.
    Said,
    Ignored,
}

/// Allocates a board sized by the settings and repaints the saved snapshot
/// over it. A missing or unreadable snapshot leaves it blank.
pub fn restore_board<S: Storage>(storage: &S, settings: &Settings) -> Board {
    let mut board = Board::new(settings.width.get().into(), settings.height.get().into());

    match storage.read(BOARD_KEY) {
        Ok(Some(snapshot)) => {
            if let Err(err) = board.restore(&snapshot) {
                warn!("Saved board could not be restored, starting blank: {}", err);
            }
        }
        Ok(None) => {}
        Err(err) => warn!("Could not read saved board, starting blank: {}", err),
    }

    board
}

/// Owns the board, settings and log, and turns messages into placements.
pub struct PlacementEngine<S: Storage + Clone> {
    storage: S,
    settings: SettingsStore<S>,
    board: Board,
    log: LogBuffer,
    history: Option<HistoryWriter>,
}

impl<S: Storage + Clone> PlacementEngine<S> {
    /// Loads settings, sizes the board from them and repaints the last saved
    /// snapshot if there is one.
    pub fn start(storage: S) -> Self {
        let settings = SettingsStore::load(storage.clone());
        let board = restore_board(&storage, settings.settings());

        let mut log = LogBuffer::new(LOG_CAPACITY);
        log.push("We're live!");

        Self {
            storage,
            settings,
            board,
            log,
            history: None,
        }
    }

    pub fn with_history(mut self, history: HistoryWriter) -> Self {
        self.history = Some(history);
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn settings(&self) -> &Settings {
        self.settings.settings()
    }

    pub fn settings_store(&self) -> &SettingsStore<S> {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore<S> {
        &mut self.settings
    }

    /// Validates and applies one placement. Checks run in order: number
    /// safety, bounds, color. The pixel is written and saved before the log
    /// entry, and nothing after the write can undo it.
    pub fn attempt_place(
        &mut self,
        x: i64,
        y: i64,
        color_token: &str,
        author: &str,
    ) -> Result<Placed, Rejected> {
        if !is_safe_integer(x) || !is_safe_integer(y) {
            return Err(Rejected::InvalidNumber);
        }

        let (x, y) = match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) if self.board.contains(x, y) => (x, y),
            _ => return Err(Rejected::OutOfBounds),
        };

        let display_color = self
            .settings
            .color_space()
            .resolve(color_token)
            .ok_or(Rejected::UnknownColor)?
            .to_string();
        let pixel = parse_display_color(&display_color).ok_or(Rejected::UnknownColor)?;

        self.board
            .set_pixel(x, y, pixel)
            .map_err(|_| Rejected::OutOfBounds)?;
        self.save_board();

        self.log.push(format!(
            "u/{} placed {} pixel at ({}, {})",
            author, color_token, x, y
        ));

        if let Some(history) = &mut self.history {
            if let Err(err) = history.record(Utc::now(), author, &display_color, x, y) {
                warn!("Could not append placement history: {}", err);
            }
        }

        Ok(Placed {
            x,
            y,
            color_token: color_token.to_string(),
            display_color,
            pixel,
        })
    }

    /// Runs a raw feed message through the pipeline.
    pub fn handle_message(&mut self, author: &str, body: &str) -> MessageOutcome {
        match parser::parse(body, author) {
            Some(command) => {
                match self.attempt_place(
                    command.x,
                    command.y,
                    &command.color_token,
                    &command.author,
                ) {
                    Ok(placed) => MessageOutcome::Placed(placed),
                    Err(rejected) => {
                        debug!("Discarded placement from u/{}: {}", author, rejected);
                        MessageOutcome::Rejected(rejected)
                    }
                }
            }
            None if self.settings().is_important_user(author) => {
                self.log.push(format!("u/{} said: {}", author, body));
                MessageOutcome::Said
            }
            None => MessageOutcome::Ignored,
        }
    }

    fn save_board(&mut self) {
        let snapshot = match self.board.serialize() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Could not encode board: {}", err);
                return;
            }
        };

        match self.storage.write(BOARD_KEY, &snapshot) {
            Ok(()) => self.board.mark_clean(),
            Err(err) => warn!("Could not save board: {}", err),
        }
    }
}
