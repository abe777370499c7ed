pub mod difficulty;
pub mod game;
pub mod renderer;

pub use game::{FireGame, Phase};
pub use renderer::FireRenderer;
