use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::difficulty::{profile, ramp_speed, scaled, ArcadeProfile, RAMP_EVERY_MS};
use super::renderer::ArcadeRenderer;
use crate::core::game::{Context, Game, GameEvent, GameRenderer, GameReport, RecordOutcome};
use crate::core::scoring::Tally;
use crate::core::settings::{Difficulty, Settings};
use crate::core::storage::Storage;
use crate::core::timer::{Countdown, Repeating};

pub const HOLES: usize = 12;
pub const COLUMNS: usize = 4;
pub const MAX_LIVES: u32 = 3;
pub const ROUND_SECS: u32 = 60;

const FIRST_SPAWN_MS: u32 = 1000;
const HIT_LINGER_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    Paused,
    End,
}

#[derive(Debug, Clone)]
pub struct Mole {
    pub letter: char,
    pub hit: bool,
    pub points: u32,
    pub timer: Countdown,
}

/// Result shown on the end screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub report: GameReport,
    pub new_record: bool,
}

/// Whack-a-Letter: twelve holes, selectable difficulty and a speed ramp.
pub struct ArcadeGame {
    pub(crate) screen: Screen,
    pub(crate) difficulty: Difficulty,
    pub(crate) holes: [Option<Mole>; HOLES],
    pub(crate) score: u32,
    pub(crate) lives: u32,
    pub(crate) time_left: u32,
    pub(crate) speed: f64,
    pub(crate) tally: Tally,
    /// Best score per difficulty, in `Difficulty::ALL` order.
    pub(crate) highs: [u32; 3],
    pub(crate) summary: Option<Summary>,
    spawn: Countdown,
    ramp: Repeating,
    second: Repeating,
    rng: StdRng,
}

fn slot(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

impl ArcadeGame {
    pub fn new(settings: &Settings, highs: [u32; 3]) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self {
            screen: Screen::Start,
            difficulty: settings.difficulty,
            holes: Default::default(),
            score: 0,
            lives: MAX_LIVES,
            time_left: ROUND_SECS,
            speed: 1.0,
            tally: Tally::default(),
            highs,
            summary: None,
            spawn: Countdown::new(FIRST_SPAWN_MS),
            ramp: Repeating::new(RAMP_EVERY_MS),
            second: Repeating::new(1000),
            rng,
        }
    }

    pub fn load(settings: &Settings, storage: &Storage) -> Self {
        let highs = Difficulty::ALL.map(|d| storage.high_score(&format!("arcade:{d}")));
        Self::new(settings, highs)
    }

    pub fn board(&self) -> String {
        format!("arcade:{}", self.difficulty)
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &'static ArcadeProfile {
        profile(self.difficulty)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn high_score(&self, difficulty: Difficulty) -> u32 {
        self.highs[slot(difficulty)]
    }

    pub fn hole(&self, idx: usize) -> Option<&Mole> {
        self.holes.get(idx).and_then(Option::as_ref)
    }

    pub fn visible(&self) -> usize {
        self.holes.iter().flatten().count()
    }

    pub fn select(&mut self, difficulty: Difficulty) {
        if self.screen == Screen::Start {
            self.difficulty = difficulty;
        }
    }

    pub fn start(&mut self, ctx: &Context) {
        if self.screen != Screen::Start {
            return;
        }
        self.screen = Screen::Playing;
        self.holes = Default::default();
        self.score = 0;
        self.lives = MAX_LIVES;
        self.time_left = ROUND_SECS;
        self.speed = 1.0;
        self.tally = Tally::default();
        self.summary = None;
        self.spawn = Countdown::new(FIRST_SPAWN_MS);
        self.ramp.reset();
        self.second.reset();
        info!(difficulty = %self.difficulty, "arcade round started");
        ctx.emit(GameEvent::Started { game: "arcade", board: self.board() });
    }

    pub fn toggle_pause(&mut self, ctx: &Context) {
        self.screen = match self.screen {
            Screen::Playing => Screen::Paused,
            Screen::Paused => Screen::Playing,
            _ => return,
        };
        ctx.emit(GameEvent::Paused(self.screen == Screen::Paused));
    }

    /// Pop a mole unless the board is at its concurrency cap or full.
    pub fn spawn_mole(&mut self, ctx: &Context) {
        let cap = self.profile().max_concurrent;
        if self.visible() >= cap {
            debug!(cap, "spawn skipped, board at capacity");
            return;
        }
        let free: Vec<usize> = (0..HOLES).filter(|i| self.holes[*i].is_none()).collect();
        let Some(&hole) = free.choose(&mut self.rng) else {
            return;
        };
        let letters: Vec<char> = ('A'..='Z').collect();
        let Some(&letter) = letters.choose(&mut self.rng) else {
            return;
        };
        let lifetime = scaled(self.profile().mole_lifetime_ms, self.speed);
        self.holes[hole] = Some(Mole { letter, hit: false, points: 0, timer: Countdown::new(lifetime) });
        ctx.emit(GameEvent::Spawned { letter });
    }

    pub fn press(&mut self, key: char, ctx: &Context) {
        if self.screen != Screen::Playing {
            return;
        }
        let key = key.to_ascii_uppercase();
        let target = self
            .holes
            .iter()
            .position(|m| m.as_ref().is_some_and(|m| !m.hit && m.letter == key));
        let Some(hole) = target else {
            ctx.emit(GameEvent::WrongKey(key));
            return;
        };

        let points = self.profile().points_per_hit;
        if let Some(mole) = self.holes[hole].as_mut() {
            mole.hit = true;
            mole.points = points;
            mole.timer.rearm(HIT_LINGER_MS);
        }
        self.score += points;
        self.tally.hit();
        ctx.emit(GameEvent::Hit { letter: key, points });
    }

    /// End the round now. Emits the report only once.
    pub fn end(&mut self, ctx: &Context) {
        if !matches!(self.screen, Screen::Playing | Screen::Paused) {
            return;
        }
        self.screen = Screen::End;
        self.holes = Default::default();
        let report = GameReport {
            game: "arcade".into(),
            board: self.board(),
            score: self.score,
            hits: self.tally.hits,
            misses: self.tally.misses,
            elapsed_secs: ROUND_SECS - self.time_left,
        };
        self.summary = Some(Summary { report: report.clone(), new_record: false });
        ctx.emit(GameEvent::Finished(report));
    }

    /// From the end screen back to difficulty selection.
    pub fn back_to_start(&mut self) {
        if self.screen == Screen::End {
            self.screen = Screen::Start;
        }
    }

    /// Spend `dt` on the spawn timer, spawning once for every interval that
    /// falls due inside it.
    fn run_spawns(&mut self, dt: u32, ctx: &Context) {
        let mut budget = dt;
        while budget >= self.spawn.remaining() {
            budget -= self.spawn.remaining();
            self.spawn.advance(self.spawn.remaining());
            self.spawn_mole(ctx);
            self.spawn.rearm(scaled(self.profile().spawn_interval_ms, self.speed));
        }
        self.spawn.advance(budget);
    }

    fn tick_moles(&mut self, dt: u32, ctx: &Context) {
        for hole in 0..HOLES {
            let Some(mole) = self.holes[hole].as_mut() else {
                continue;
            };
            if !mole.timer.advance(dt) {
                continue;
            }
            let (letter, was_hit) = (mole.letter, mole.hit);
            self.holes[hole] = None;
            if !was_hit {
                self.lives = self.lives.saturating_sub(1);
                self.tally.miss();
                ctx.emit(GameEvent::Miss { letter });
            }
        }
    }
}

impl Game for ArcadeGame {
    fn on_tick(&mut self, dt: u32, ctx: &Context) {
        if self.screen != Screen::Playing {
            return;
        }

        self.tick_moles(dt, ctx);
        if self.lives == 0 {
            self.end(ctx);
            return;
        }

        for _ in 0..self.ramp.advance(dt) {
            self.speed = ramp_speed(self.speed, self.profile());
            ctx.emit(GameEvent::Ramp {
                spawn_ms: scaled(self.profile().spawn_interval_ms, self.speed),
                speed: self.speed,
            });
        }

        self.run_spawns(dt, ctx);

        for _ in 0..self.second.advance(dt) {
            self.time_left = self.time_left.saturating_sub(1);
        }
        if self.time_left == 0 {
            self.end(ctx);
        }
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context) {
        match (self.screen, event.code) {
            (Screen::Start, KeyCode::Left) => self.select(self.difficulty.prev()),
            (Screen::Start, KeyCode::Right) => self.select(self.difficulty.next()),
            (Screen::Start, KeyCode::Char(c @ '1'..='3')) => {
                self.select(Difficulty::ALL[c as usize - '1' as usize]);
            }
            (Screen::Start, KeyCode::Enter | KeyCode::Char(' ')) => self.start(ctx),
            (Screen::Playing | Screen::Paused, KeyCode::Char(' ')) => self.toggle_pause(ctx),
            (Screen::Playing | Screen::Paused, KeyCode::End) => self.end(ctx),
            (Screen::Playing, KeyCode::Char(c)) if c.is_ascii_alphabetic() => self.press(c, ctx),
            (Screen::End, KeyCode::Enter) => self.back_to_start(),
            _ => {}
        }
    }

    fn handle_record(&mut self, outcome: RecordOutcome) {
        self.highs[slot(self.difficulty)] = outcome.best;
        if let Some(summary) = self.summary.as_mut() {
            summary.new_record = outcome.new_high_score;
        }
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        ArcadeRenderer::render(frame, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn game_with(difficulty: Difficulty) -> (ArcadeGame, Context, UnboundedReceiver<GameEvent>) {
        let (ctx, rx) = Context::channel();
        let settings = Settings { difficulty, seed: Some(7), ..Settings::default() };
        (ArcadeGame::new(&settings, [0; 3]), ctx, rx)
    }

    fn key(game: &mut ArcadeGame, code: KeyCode, ctx: &Context) {
        game.handle_input(KeyEvent::new(code, KeyModifiers::NONE), ctx);
    }

    fn drain(rx: &mut UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn start_screen_picks_difficulty() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Easy);
        key(&mut game, KeyCode::Right, &ctx);
        assert_eq!(game.difficulty(), Difficulty::Medium);
        key(&mut game, KeyCode::Char('3'), &ctx);
        assert_eq!(game.difficulty(), Difficulty::Hard);
        key(&mut game, KeyCode::Enter, &ctx);
        assert_eq!(game.screen(), Screen::Playing);
        assert_eq!(game.board(), "arcade:hard");

        // Locked once playing.
        key(&mut game, KeyCode::Left, &ctx);
        assert_eq!(game.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn first_spawn_after_one_second() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        game.on_tick(999, &ctx);
        assert_eq!(game.visible(), 0);
        game.on_tick(1, &ctx);
        assert_eq!(game.visible(), 1);

        // Then every spawn interval at speed 1.
        game.on_tick(1999, &ctx);
        assert_eq!(game.visible(), 1);
        game.on_tick(1, &ctx);
        assert_eq!(game.visible(), 2);
    }

    #[test]
    fn long_tick_catches_up_on_spawns() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Hard);
        game.start(&ctx);
        // Due at 1000, 2000, 3000, 4000 and 5000 ms.
        game.on_tick(5000, &ctx);
        assert_eq!(game.visible(), 5);
        assert_eq!(game.spawn.remaining(), 1000);
    }

    #[test]
    fn concurrency_cap_holds() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Medium);
        game.start(&ctx);
        for _ in 0..HOLES {
            game.spawn_mole(&ctx);
        }
        assert_eq!(game.visible(), 4);
    }

    #[test]
    fn speed_ramps_every_ten_seconds_and_caps() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Medium);
        game.start(&ctx);
        game.lives = u32::MAX;
        game.on_tick(RAMP_EVERY_MS, &ctx);
        assert!((game.speed() - 1.0 / 0.9).abs() < 1e-9);

        game.speed = 2.9;
        game.on_tick(RAMP_EVERY_MS, &ctx);
        assert_eq!(game.speed(), 3.0);
    }

    #[test]
    fn hits_score_profile_points_once() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Hard);
        game.start(&ctx);
        game.spawn_mole(&ctx);
        let letter = game.holes.iter().flatten().next().unwrap().letter;

        game.press(letter.to_ascii_lowercase(), &ctx);
        assert_eq!(game.score(), 20);
        game.press(letter, &ctx);
        assert_eq!(game.score(), 20);
        assert_eq!(game.tally().hits, 1);

        // Hit mole ducks without costing a life.
        game.on_tick(HIT_LINGER_MS, &ctx);
        assert_eq!(game.visible(), 0);
        assert_eq!(game.lives(), MAX_LIVES);
    }

    #[test]
    fn wrong_key_does_not_score() {
        let (mut game, ctx, mut rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        drain(&mut rx);
        game.press('q', &ctx);
        assert_eq!(game.score(), 0);
        assert_eq!(drain(&mut rx), vec![GameEvent::WrongKey('Q')]);
    }

    #[test]
    fn lives_floor_at_zero_and_report_once() {
        let (mut game, ctx, mut rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        for _ in 0..3 {
            game.spawn_mole(&ctx);
        }
        game.lives = 2;
        game.on_tick(3000, &ctx);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.screen(), Screen::End);

        key(&mut game, KeyCode::End, &ctx);
        game.on_tick(1000, &ctx);
        let finished: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Finished(report) => Some(report),
                _ => None,
            })
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].misses, 3);
    }

    #[test]
    fn pause_freezes_clock_and_moles() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        game.spawn_mole(&ctx);
        key(&mut game, KeyCode::Char(' '), &ctx);
        assert_eq!(game.screen(), Screen::Paused);
        game.on_tick(60_000, &ctx);
        assert_eq!(game.time_left(), ROUND_SECS);
        assert_eq!(game.visible(), 1);
        key(&mut game, KeyCode::Char(' '), &ctx);
        assert_eq!(game.screen(), Screen::Playing);
    }

    #[test]
    fn end_key_and_record_flow() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        game.score = 120;
        key(&mut game, KeyCode::End, &ctx);
        assert_eq!(game.screen(), Screen::End);

        game.handle_record(RecordOutcome { new_high_score: true, best: 120 });
        assert!(game.summary().unwrap().new_record);
        assert_eq!(game.high_score(Difficulty::Easy), 120);

        key(&mut game, KeyCode::Enter, &ctx);
        assert_eq!(game.screen(), Screen::Start);
    }

    #[test]
    fn time_runs_out() {
        let (mut game, ctx, _rx) = game_with(Difficulty::Easy);
        game.start(&ctx);
        for _ in 0..ROUND_SECS {
            game.holes = Default::default();
            game.on_tick(1000, &ctx);
        }
        assert_eq!(game.screen(), Screen::End);
        assert_eq!(game.summary().unwrap().report.elapsed_secs, ROUND_SECS);
    }
}
