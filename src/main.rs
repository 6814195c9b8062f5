use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::{
    restore_board, ColorSpace, FileStorage, HistoryWriter, MessageOutcome, PlacementEngine,
    SettingKey, SettingsStore,
};
use feed::{FeedConfig, FeedConnection, FeedEvent};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Where settings and the board snapshot are kept (defaults to the OS data directory)
    #[clap(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Connect to the configured feed and place pixels from incoming comments
    Live {
        /// Append every placement to this CSV file
        #[clap(long)]
        history: Option<PathBuf>,
    },
    /// Run one message through the pipeline as if it came from the feed
    Place {
        author: String,
        #[clap(required = true)]
        message: Vec<String>,
    },
    /// Render the saved board to an image
    Render {
        out_file: PathBuf,
        #[clap(short, long, default_value = "1")]
        scale: u32,
    },
    /// List the colors that can currently be placed
    Colors,
    /// Show or edit settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCommand {
    /// Print all settings as JSON
    Show,
    /// Print a single setting
    Get { key: String },
    /// Replace a single setting; values that aren't valid JSON are taken as strings
    Set { key: String, value: String },
    /// Apply a (partial) settings object; unknown keys are ignored
    Apply { json: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let storage = open_storage(cli.data_dir)?;

    match cli.command {
        Commands::Live { history } => {
            let mut engine = PlacementEngine::start(storage);
            if let Some(path) = history {
                let history = HistoryWriter::open(&path)
                    .with_context(|| format!("failed opening history at {}", path.display()))?;
                engine = engine.with_history(history);
            }

            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed starting runtime")?
                .block_on(run_live(engine))
        }
        Commands::Place { author, message } => {
            let mut engine = PlacementEngine::start(storage);

            match engine.handle_message(&author, &message.join(" ")) {
                MessageOutcome::Placed(_) | MessageOutcome::Said => {
                    if let Some(entry) = engine.log().last() {
                        println!("{}", entry);
                    }
                }
                MessageOutcome::Rejected(rejected) => println!("rejected: {}", rejected),
                MessageOutcome::Ignored => println!("ignored: not a placement command"),
            }

            Ok(())
        }
        Commands::Render { out_file, scale } => {
            if scale == 0 {
                bail!("scale must be at least 1");
            }

            let settings = SettingsStore::load(storage.clone());
            let board = restore_board(&storage, settings.settings());
            let (width, height) = scaled_size(board.width(), board.height(), scale)?;
            let canvas = image::imageops::resize(
                &board.to_image(),
                width,
                height,
                image::imageops::FilterType::Nearest,
            );

            canvas
                .save(&out_file)
                .with_context(|| format!("failed saving {}", out_file.display()))?;
            info!("Rendered board to {}", out_file.display());

            Ok(())
        }
        Commands::Colors => {
            let settings = SettingsStore::load(storage);
            let color_space = settings.color_space();

            if *color_space == ColorSpace::Unconfigured {
                warn!("colors is neither a list nor a palette, placement is disabled");
            }
            for (name, display) in color_space.entries() {
                println!("{:<12} {}", name, display);
            }

            Ok(())
        }
        Commands::Settings { command } => run_settings(SettingsStore::load(storage), command),
    }
}

fn scaled_size(width: u32, height: u32, scale: u32) -> Result<(u32, u32)> {
    match (width.checked_mul(scale), height.checked_mul(scale)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => bail!("scale {} is too large for a {}x{} board", scale, width, height),
    }
}

fn open_storage(data_dir: Option<PathBuf>) -> Result<FileStorage> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("unable to locate OS data directory")?
            .join("place-live"),
    };

    FileStorage::open(&data_dir)
        .with_context(|| format!("failed creating data dir at {}", data_dir.display()))
}

fn run_settings(mut store: SettingsStore<FileStorage>, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show => {
            println!("{}", serde_json::to_string_pretty(store.settings())?);
        }
        SettingsCommand::Get { key } => {
            let key: SettingKey = key.parse()?;
            println!("{}", serde_json::to_string_pretty(&store.get(key))?);
        }
        SettingsCommand::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let value = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
            store.set(key, value)?;
            info!("Updated {}", key);
        }
        SettingsCommand::Apply { json } => {
            let applied = store.apply_form(&json)?;
            info!("Applied {} setting(s)", applied);
        }
    }

    Ok(())
}

async fn run_live(mut engine: PlacementEngine<FileStorage>) -> Result<()> {
    for line in engine.log().lines() {
        println!("{}", line);
    }

    let mut connection = FeedConnection::new(FeedConfig::from_settings(engine.settings()));
    if let Err(err) = connection.open().await {
        warn!("No feed connection: {}", err);
        return Ok(());
    }

    loop {
        let event = tokio::select! {
            event = connection.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                connection.close().await;
                connection.next_event().await
            }
        };

        match event {
            Some(FeedEvent::Connected) => println!("● LIVE"),
            Some(FeedEvent::Disconnected) => {
                println!("○ OFFLINE");
                break;
            }
            Some(FeedEvent::Comment(comment)) => {
                match engine.handle_message(&comment.author, &comment.body) {
                    MessageOutcome::Placed(_) | MessageOutcome::Said => {
                        if let Some(entry) = engine.log().last() {
                            println!("{}", entry);
                        }
                    }
                    MessageOutcome::Rejected(_) | MessageOutcome::Ignored => {}
                }
            }
            None => break,
        }
    }

    Ok(())
}
