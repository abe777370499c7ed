/// Core game interface for letterterm
use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Summary of a finished round, handed to storage by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub game: String,
    /// High-score key, e.g. `arcade:hard`.
    pub board: String,
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
    pub elapsed_secs: u32,
}

/// What storage made of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub new_high_score: bool,
    pub best: u32,
}

/// Things a game wants the outside world to know about. These stand in for
/// the sound cues of a graphical build and feed logging and statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started { game: &'static str, board: String },
    Spawned { letter: char },
    Hit { letter: char, points: u32 },
    Miss { letter: char },
    WrongKey(char),
    LevelUp { level: u32 },
    Ramp { spawn_ms: u32, speed: f64 },
    Paused(bool),
    Finished(GameReport),
}

/// Handle given to games for emitting events.
#[derive(Clone)]
pub struct Context {
    pub(crate) tx: UnboundedSender<GameEvent>,
}

impl Context {
    pub fn new(tx: UnboundedSender<GameEvent>) -> Self {
        Self { tx }
    }

    /// A context plus the receiving end, for driving a game outside the engine.
    pub fn channel() -> (Self, UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: GameEvent) {
        // The engine only drops the receiver on shutdown.
        let _ = self.tx.send(event);
    }
}

/// Renderer trait for drawing a game's state with Ratatui
pub trait GameRenderer<S> {
    fn render(frame: &mut ratatui::Frame, state: &S);
}

/// Main game trait that every variant implements.
pub trait Game {
    /// Heartbeat of the game. Defaults to roughly 60 frames per second.
    fn tick_rate(&self) -> Duration {
        Duration::from_millis(16)
    }

    /// Advance game time by `dt` milliseconds.
    fn on_tick(&mut self, dt: u32, ctx: &Context);

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context);

    /// Called after the engine persisted a `GameEvent::Finished` report.
    fn handle_record(&mut self, _outcome: RecordOutcome) {}

    fn render(&self, frame: &mut ratatui::Frame);
}
