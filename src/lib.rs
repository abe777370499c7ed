pub mod cli;
pub mod logging;

pub mod core {
	pub mod engine;
	pub mod error;
	pub mod game;
	pub mod lobby;
	pub mod scoring;
	pub mod settings;
	pub mod storage;
	pub mod timer;
}

pub mod games;

// Re-export for convenience
pub use crate::core::game::{Context, Game, GameEvent};
