use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::debug;

use super::renderer::MoleRenderer;
use crate::core::game::{Context, Game, GameEvent, GameRenderer, GameReport, RecordOutcome};
use crate::core::scoring::Tally;
use crate::core::settings::Settings;
use crate::core::storage::Storage;
use crate::core::timer::{Countdown, Repeating};

pub const HOLES: usize = 9;
pub const MAX_LIVES: u32 = 3;
pub const ROUND_SECS: u32 = 60;

const START_SPAWN_MS: u32 = 2000;
const START_LIFETIME_MS: u32 = 3000;
const MIN_SPAWN_MS: u32 = 800;
const MIN_LIFETIME_MS: u32 = 1500;
const LEVEL_STEP_MS: u32 = 200;
const POINTS_PER_LEVEL: u32 = 10;
const SCORE_PER_LEVEL: u32 = 200;
const HIT_LINGER_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Playing,
    Paused,
    Over,
}

#[derive(Debug, Clone)]
pub struct Mole {
    pub letter: char,
    pub hit: bool,
    /// Time left before it ducks: its lifetime while up, the linger after a hit.
    pub timer: Countdown,
}

/// Letter Mole: a 3x3 field of holes, levels and three lives.
pub struct MoleGame {
    pub(crate) holes: [Option<Mole>; HOLES],
    pub(crate) phase: Phase,
    pub(crate) score: u32,
    pub(crate) level: u32,
    pub(crate) lives: u32,
    pub(crate) time_left: u32,
    pub(crate) spawn_ms: u32,
    pub(crate) lifetime_ms: u32,
    spawn: Repeating,
    second: Repeating,
    pub(crate) tally: Tally,
    rng: StdRng,
    pub(crate) best: u32,
    pub(crate) new_record: bool,
}

impl MoleGame {
    pub fn new(settings: &Settings, best: u32) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self {
            holes: Default::default(),
            phase: Phase::Idle,
            score: 0,
            level: 1,
            lives: MAX_LIVES,
            time_left: ROUND_SECS,
            spawn_ms: START_SPAWN_MS,
            lifetime_ms: START_LIFETIME_MS,
            spawn: Repeating::new(START_SPAWN_MS),
            second: Repeating::new(1000),
            tally: Tally::default(),
            rng,
            best,
            new_record: false,
        }
    }

    pub fn load(settings: &Settings, storage: &Storage) -> Self {
        Self::new(settings, storage.high_score("mole"))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn spawn_ms(&self) -> u32 {
        self.spawn_ms
    }

    pub fn lifetime_ms(&self) -> u32 {
        self.lifetime_ms
    }

    pub fn hole(&self, idx: usize) -> Option<&Mole> {
        self.holes.get(idx).and_then(Option::as_ref)
    }

    /// Holes with a mole that can still be whacked.
    pub fn active(&self) -> impl Iterator<Item = (usize, &Mole)> {
        self.holes
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().filter(|m| !m.hit).map(|m| (i, m)))
    }

    pub fn start(&mut self, ctx: &Context) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Playing;
        self.spawn.set_period(self.spawn_ms);
        self.second.reset();
        ctx.emit(GameEvent::Started { game: "mole", board: "mole".into() });
    }

    pub fn toggle_pause(&mut self, ctx: &Context) {
        self.phase = match self.phase {
            Phase::Playing => Phase::Paused,
            Phase::Paused => Phase::Playing,
            other => {
                debug!(phase = ?other, "pause ignored");
                return;
            }
        };
        ctx.emit(GameEvent::Paused(self.phase == Phase::Paused));
    }

    /// Back to a fresh, not yet started round.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.holes = Default::default();
        self.score = 0;
        self.level = 1;
        self.lives = MAX_LIVES;
        self.time_left = ROUND_SECS;
        self.spawn_ms = START_SPAWN_MS;
        self.lifetime_ms = START_LIFETIME_MS;
        self.spawn = Repeating::new(START_SPAWN_MS);
        self.second.reset();
        self.tally = Tally::default();
        self.new_record = false;
    }

    /// Pop a mole into a random free hole with a letter not already showing.
    pub fn spawn_mole(&mut self, ctx: &Context) {
        let free: Vec<usize> = (0..HOLES).filter(|i| self.holes[*i].is_none()).collect();
        let Some(&hole) = free.choose(&mut self.rng) else {
            return;
        };
        let showing: Vec<char> = self.holes.iter().flatten().map(|m| m.letter).collect();
        let letters: Vec<char> = ('A'..='Z').filter(|c| !showing.contains(c)).collect();
        let Some(&letter) = letters.choose(&mut self.rng) else {
            return;
        };
        self.holes[hole] = Some(Mole {
            letter,
            hit: false,
            timer: Countdown::new(self.lifetime_ms),
        });
        ctx.emit(GameEvent::Spawned { letter });
    }

    pub fn press_letter(&mut self, key: char, ctx: &Context) {
        if self.phase != Phase::Playing {
            return;
        }
        let key = key.to_ascii_uppercase();
        let found = self.active().find(|(_, m)| m.letter == key).map(|(i, _)| i);
        match found {
            Some(hole) => self.whack(hole, ctx),
            None => ctx.emit(GameEvent::WrongKey(key)),
        }
    }

    /// Whack a hole directly, the keypad equivalent of clicking it.
    pub fn press_hole(&mut self, hole: usize, ctx: &Context) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.hole(hole).is_some_and(|m| !m.hit) {
            self.whack(hole, ctx);
        }
    }

    fn whack(&mut self, hole: usize, ctx: &Context) {
        let Some(mole) = self.holes[hole].as_mut() else {
            return;
        };
        mole.hit = true;
        mole.timer.rearm(HIT_LINGER_MS);
        let letter = mole.letter;

        let points = self.level * POINTS_PER_LEVEL;
        self.score += points;
        self.tally.hit();
        ctx.emit(GameEvent::Hit { letter, points });
        self.check_level_up(ctx);
    }

    fn check_level_up(&mut self, ctx: &Context) {
        let level = self.score / SCORE_PER_LEVEL + 1;
        if level <= self.level {
            return;
        }
        self.level = level;
        self.spawn_ms = self.spawn_ms.saturating_sub(LEVEL_STEP_MS).max(MIN_SPAWN_MS);
        self.lifetime_ms = self.lifetime_ms.saturating_sub(LEVEL_STEP_MS).max(MIN_LIFETIME_MS);
        self.spawn.set_period(self.spawn_ms);
        ctx.emit(GameEvent::LevelUp { level });
        ctx.emit(GameEvent::Ramp { spawn_ms: self.spawn_ms, speed: 1.0 });
    }

    fn lose_life(&mut self, letter: char, ctx: &Context) {
        self.lives = self.lives.saturating_sub(1);
        self.tally.miss();
        ctx.emit(GameEvent::Miss { letter });
        if self.lives == 0 {
            self.game_over(ctx);
        }
    }

    fn game_over(&mut self, ctx: &Context) {
        if self.phase == Phase::Over {
            return;
        }
        self.phase = Phase::Over;
        self.holes = Default::default();
        ctx.emit(GameEvent::Finished(GameReport {
            game: "mole".into(),
            board: "mole".into(),
            score: self.score,
            hits: self.tally.hits,
            misses: self.tally.misses,
            elapsed_secs: ROUND_SECS - self.time_left,
        }));
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
                self.lose_life(letter, ctx);
                if self.phase == Phase::Over {
                    return;
                }
            }
        }
    }
}

impl Game for MoleGame {
    fn on_tick(&mut self, dt: u32, ctx: &Context) {
        if self.phase != Phase::Playing {
            return;
        }

        self.tick_moles(dt, ctx);
        if self.phase != Phase::Playing {
            return;
        }

        for _ in 0..self.spawn.advance(dt) {
            self.spawn_mole(ctx);
        }

        for _ in 0..self.second.advance(dt) {
            self.time_left = self.time_left.saturating_sub(1);
            if self.time_left == 0 {
                self.game_over(ctx);
                return;
            }
        }
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context) {
        match event.code {
            KeyCode::Char(' ') => match self.phase {
                Phase::Idle => self.start(ctx),
                Phase::Playing | Phase::Paused => self.toggle_pause(ctx),
                Phase::Over => {}
            },
            KeyCode::Enter => {
                let again = self.phase == Phase::Over;
                self.reset();
                if again {
                    self.start(ctx);
                }
            }
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.press_letter(c, ctx),
            KeyCode::Char(c @ '1'..='9') => {
                let hole = c as usize - '1' as usize;
                self.press_hole(hole, ctx);
            }
            _ => {}
        }
    }

    fn handle_record(&mut self, outcome: RecordOutcome) {
        self.best = outcome.best;
        self.new_record = outcome.new_high_score;
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        MoleRenderer::render(frame, self);
    }
}
