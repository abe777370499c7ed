use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use ratatui::DefaultTerminal;
use tracing::{info, warn};

use crate::core::lobby::{stats_lines, LobbyManager, LobbyResult};
use crate::core::settings::{Difficulty, Settings, MAX_SPEED_LEVEL, MIN_SPEED_LEVEL};
use crate::core::storage::Storage;
use crate::games::{get_all_games, get_game, GameInfo, GameRegistry};

#[derive(Parser, Debug)]
#[command(name = "letterterm")]
#[command(about = "⌨️ Typing games for the terminal")]
#[command(version)]
pub struct Cli {
    /// Directory for save and settings files (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Where to write the log (defaults to letterterm.log in the data dir)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Seed for the letter generator, for reproducible rounds
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Play a game directly, skipping the lobby
    Play {
        /// Game id, see `letterterm list`
        game: String,

        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        /// Speed level from 1 (slowest) to 10
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(MIN_SPEED_LEVEL as i64..=MAX_SPEED_LEVEL as i64))]
        speed: Option<u8>,

        /// Use upper case letters
        #[arg(long)]
        uppercase: bool,

        /// Round length in seconds
        #[arg(long)]
        duration: Option<u32>,
    },
    /// List available games
    List,
    /// Print lifetime statistics and high scores
    Stats {
        /// Forget all scores and statistics
        #[arg(long)]
        reset: bool,
    },
}

impl Cli {
    pub fn storage(&self) -> Result<Storage> {
        Ok(match &self.data_dir {
            Some(dir) => Storage::at(dir)?,
            None => Storage::open_default()?,
        })
    }
}

pub async fn run_cli(cli: Cli, storage: Storage) -> Result<()> {
    match cli.command {
        Some(Commands::Play { game, difficulty, speed, uppercase, duration }) => {
            let entry = get_game(&game).ok_or_else(|| {
                let known: Vec<&str> = get_all_games().iter().map(|g| g.info.id).collect();
                anyhow!("game '{game}' not found (available: {})", known.join(", "))
            })?;

            let mut settings = storage.load_settings();
            if let Some(difficulty) = difficulty {
                settings.difficulty = difficulty;
            }
            if let Some(speed) = speed {
                settings.speed_level = speed;
            }
            if let Some(duration) = duration {
                settings.duration_secs = duration;
            }
            settings.uppercase |= uppercase;
            settings.last_game = Some(entry.info.id.to_string());
            let settings = Settings { seed: cli.seed, ..settings.normalized() };
            if let Err(e) = storage.save_settings(&settings) {
                warn!(error = %e, "could not save settings");
            }

            let terminal = ratatui::init();
            let result = (entry.launcher)(settings, storage, terminal).await;
            ratatui::restore();
            result.map(drop)
        }

        Some(Commands::List) => {
            println!("🎮 Available games:");
            println!();
            for GameRegistry { info, .. } in get_all_games() {
                println!("📦 {} ({})", info.name, info.id);
                println!("   {}", info.description);
                println!();
            }
            Ok(())
        }

        Some(Commands::Stats { reset }) => {
            if reset {
                storage.reset()?;
                println!("Statistics and high scores cleared.");
                return Ok(());
            }
            for line in stats_lines(&storage.load()) {
                println!("{line}");
            }
            Ok(())
        }

        None => {
            let terminal = ratatui::init();
            let result = run_lobby(terminal, &storage, cli.seed).await;
            ratatui::restore();
            result
        }
    }
}

async fn run_lobby(mut terminal: DefaultTerminal, storage: &Storage, seed: Option<u64>) -> Result<()> {
    let games = get_all_games();
    let infos: Vec<GameInfo> = games.iter().map(|g| g.info.clone()).collect();
    let mut lobby = LobbyManager::new(storage.load_settings(), storage.load(), &infos);

    loop {
        match lobby.run(&mut terminal, &infos)? {
            LobbyResult::Quit => return Ok(()),
            LobbyResult::Play(id, settings) => {
                if let Err(e) = storage.save_settings(&settings) {
                    warn!(error = %e, "could not save settings");
                }
                let Some(entry) = games.iter().find(|g| g.info.id == id) else {
                    continue;
                };
                info!(game = %id, "starting from lobby");
                terminal = (entry.launcher)(Settings { seed, ..settings }, storage.clone(), terminal).await?;
                lobby.set_save(storage.load());
            }
        }
    }
}
