use crate::core::game::{Context, Game, GameEvent};
use crate::core::storage::Storage;
use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::StreamExt;
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// What the engine does with a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRoute {
    /// Hand it to the game.
    Game,
    /// Leave the game and go back to the lobby.
    Leave,
    /// Releases and repeats.
    Ignore,
}

pub fn route(key: &KeyEvent) -> KeyRoute {
    if key.kind != KeyEventKind::Press {
        return KeyRoute::Ignore;
    }
    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || ctrl_c {
        KeyRoute::Leave
    } else {
        KeyRoute::Game
    }
}

/// Whole milliseconds elapsed between `last` and `now`, plus the instant they
/// bring `last` up to. The sub-millisecond remainder stays for the next tick.
fn whole_millis(last: Instant, now: Instant) -> (u32, Instant) {
    let dt = now.saturating_duration_since(last).as_millis().min(u32::MAX as u128) as u32;
    (dt, last + Duration::from_millis(dt as u64))
}

pub struct Engine<G: Game> {
    game: G,
    storage: Storage,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G, storage: Storage) -> Self {
        Self { game, storage }
    }

    /// Run until the player leaves with Esc or Ctrl-C, then hand the terminal back.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<DefaultTerminal> {
        let (ctx, mut events) = Context::channel();
        let mut keys = EventStream::new();

        let mut ticker = tokio::time::interval(self.game.tick_rate());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();

        loop {
            terminal.draw(|f| self.game.render(f))?;

            tokio::select! {
                // INPUT
                maybe_event = keys.next() => {
                    let Some(event) = maybe_event else { break };
                    if let Event::Key(key) = event? {
                        match route(&key) {
                            KeyRoute::Game => self.game.handle_input(key, &ctx),
                            KeyRoute::Leave => break,
                            KeyRoute::Ignore => {}
                        }
                    }
                }

                // EVENTS: whatever the game reported since last time
                Some(event) = events.recv() => {
                    self.dispatch(event);
                }

                // TICK: game heartbeat
                _ = ticker.tick() => {
                    let (dt, advanced) = whole_millis(last_tick, Instant::now());
                    last_tick = advanced;
                    self.game.on_tick(dt, &ctx);
                }
            }
        }

        // Settle anything emitted by the final input.
        while let Ok(event) = events.try_recv() {
            self.dispatch(event);
        }
        Ok(terminal)
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::Started { game, board } => info!(game, board = %board, "round started"),
            GameEvent::Spawned { letter } => debug!(%letter, "spawned"),
            GameEvent::Hit { letter, points } => debug!(%letter, points, "hit"),
            GameEvent::Miss { letter } => debug!(%letter, "missed"),
            GameEvent::WrongKey(key) => debug!(%key, "wrong key"),
            GameEvent::LevelUp { level } => info!(level, "level up"),
            GameEvent::Ramp { spawn_ms, speed } => debug!(spawn_ms, speed, "difficulty ramp"),
            GameEvent::Paused(paused) => debug!(paused, "pause toggled"),
            GameEvent::Finished(report) => {
                info!(board = %report.board, score = report.score, hits = report.hits, misses = report.misses, "round finished");
                match self.storage.record(&report) {
                    Ok(outcome) => self.game.handle_record(outcome),
                    Err(e) => warn!(error = %e, "could not save result"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::{GameReport, RecordOutcome};
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        outcomes: Vec<RecordOutcome>,
    }

    impl Game for Recorder {
        fn on_tick(&mut self, _dt: u32, _ctx: &Context) {}
        fn handle_input(&mut self, _event: KeyEvent, _ctx: &Context) {}
        fn handle_record(&mut self, outcome: RecordOutcome) {
            self.outcomes.push(outcome);
        }
        fn render(&self, _frame: &mut ratatui::Frame) {}
    }

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent { code, modifiers, kind, state: KeyEventState::NONE }
    }

    fn finished(score: u32) -> GameEvent {
        GameEvent::Finished(GameReport {
            game: "mole".into(),
            board: "mole".into(),
            score,
            hits: 3,
            misses: 1,
            elapsed_secs: 60,
        })
    }

    #[test]
    fn only_presses_reach_the_game() {
        let a = |kind| route(&key(KeyCode::Char('a'), KeyModifiers::NONE, kind));
        assert_eq!(a(KeyEventKind::Press), KeyRoute::Game);
        assert_eq!(a(KeyEventKind::Release), KeyRoute::Ignore);
        assert_eq!(a(KeyEventKind::Repeat), KeyRoute::Ignore);
        assert_eq!(
            route(&key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Release)),
            KeyRoute::Ignore
        );
    }

    #[test]
    fn esc_and_ctrl_c_leave() {
        assert_eq!(route(&key(KeyCode::Esc, KeyModifiers::NONE, KeyEventKind::Press)), KeyRoute::Leave);
        assert_eq!(
            route(&key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press)),
            KeyRoute::Leave
        );
        assert_eq!(route(&key(KeyCode::Char('c'), KeyModifiers::NONE, KeyEventKind::Press)), KeyRoute::Game);
    }

    #[test]
    fn remainder_carries_into_next_tick() {
        let start = Instant::now();
        let (dt, last) = whole_millis(start, start + Duration::from_micros(16_700));
        assert_eq!(dt, 16);
        let (dt, last) = whole_millis(last, start + Duration::from_micros(33_400));
        assert_eq!(dt, 17);
        assert_eq!(last, start + Duration::from_millis(33));

        // 300 ticks of 16.7 ms lose less than a millisecond in total.
        let mut last = start;
        let mut game_ms = 0u64;
        for i in 1..=300u64 {
            let (dt, next) = whole_millis(last, start + Duration::from_micros(16_700 * i));
            game_ms += dt as u64;
            last = next;
        }
        assert_eq!(game_ms, 5010);
    }

    #[test]
    fn finished_rounds_are_recorded_and_reported_back() {
        let dir = std::env::temp_dir().join(format!("letterterm-engine-{}", rand::random::<u64>()));
        let storage = Storage::at(dir).unwrap();
        let mut engine = Engine::new(Recorder::default(), storage.clone());

        engine.dispatch(finished(120));
        engine.dispatch(GameEvent::Hit { letter: 'A', points: 10 });
        engine.dispatch(finished(80));

        assert_eq!(
            engine.game.outcomes,
            vec![
                RecordOutcome { new_high_score: true, best: 120 },
                RecordOutcome { new_high_score: false, best: 120 },
            ]
        );
        assert_eq!(storage.high_score("mole"), 120);
        assert_eq!(storage.load().stats.total_games, 2);
    }
}
