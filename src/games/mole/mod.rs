pub mod game;
pub mod renderer;

pub use game::{MoleGame, Phase};
pub use renderer::MoleRenderer;
