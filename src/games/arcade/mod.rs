pub mod difficulty;
pub mod game;
pub mod renderer;

pub use game::{ArcadeGame, Screen};
pub use renderer::ArcadeRenderer;
