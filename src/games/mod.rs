pub mod macros;
pub mod arcade;
pub mod fire;
pub mod mole;

use std::future::Future;
use std::pin::Pin;
use anyhow::Result;
use ratatui::DefaultTerminal;
use crate::core::settings::{OptionKind, Settings};
use crate::core::storage::Storage;
use crate::register_games;

/// Metadata about a game
#[derive(Clone, Debug)]
pub struct GameInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub author: &'static str,
    /// Launch settings the lobby offers for this game.
    pub options: &'static [OptionKind],
}

/// Game launcher - builds the game and runs it until the player leaves,
/// then hands the terminal back to the lobby
pub type GameLauncher = fn(Settings, Storage, DefaultTerminal)
    -> Pin<Box<dyn Future<Output = Result<DefaultTerminal>>>>;

/// Registry entry containing metadata and launcher
pub struct GameRegistry {
    pub info: GameInfo,
    pub launcher: GameLauncher,
}

// Register all games here - a new game only needs a new entry
register_games! {
    fire => {
        game: FireGame,
        id: "fire",
        name: "Letter Fire",
        description: "Type falling letters to shoot them down",
        author: "letterterm",
        options: [Difficulty, SpeedLevel, LetterCase, Duration]
    },
    mole => {
        game: MoleGame,
        id: "mole",
        name: "Letter Mole",
        description: "Whack moles by their letters, level up, keep your lives",
        author: "letterterm",
        options: []
    },
    arcade => {
        game: ArcadeGame,
        id: "arcade",
        name: "Whack-a-Letter",
        description: "Twelve holes, three difficulties and a speed ramp",
        author: "letterterm",
        options: [Difficulty]
    }
}
