use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::difficulty::{profile, FireProfile, Ramp};
use super::renderer::FireRenderer;
use crate::core::game::{Context, Game, GameEvent, GameRenderer, GameReport, RecordOutcome};
use crate::core::scoring::Tally;
use crate::core::settings::{Difficulty, Settings};
use crate::core::storage::Storage;
use crate::core::timer::{Countdown, Repeating};

pub const FIELD_WIDTH: f64 = 800.0;
pub const FIELD_HEIGHT: f64 = 600.0;
pub const LETTER_SIZE: f64 = 30.0;
pub const PLANE_WIDTH: f64 = 80.0;
pub const PLANE_Y: f64 = FIELD_HEIGHT - 100.0;

const FRAME_MS: f64 = 1000.0 / 60.0;
const MIN_LETTER_GAP: f64 = 50.0;
const PLACEMENT_ATTEMPTS: u32 = 50;
const SPAWN_JITTER_MS: f64 = 250.0;
const FALL_JITTER: f64 = 0.1;
const SNAP_DISTANCE: f64 = 2.0;
const POINTS_PER_HIT: u32 = 10;
const BURST_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Playing,
    Over,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Letter {
    pub id: u64,
    pub ch: char,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub x: f64,
    pub y: f64,
    pub ch: char,
    pub target: u64,
}

#[derive(Debug, Clone)]
pub struct Burst {
    pub x: f64,
    pub y: f64,
    pub ch: char,
    pub life: Countdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub x: f64,
    pub target_x: f64,
    pub moving: bool,
    /// Letter the plane is lining up on; cleared when it fires.
    pub target: Option<u64>,
}

impl Plane {
    fn centered() -> Self {
        let x = FIELD_WIDTH / 2.0;
        Self { x, target_x: x, moving: false, target: None }
    }

    fn busy(&self) -> bool {
        self.moving || self.target.is_some()
    }
}

/// Letter Fire: letters rain down and the plane shoots the one you type.
pub struct FireGame {
    pub(crate) difficulty: Difficulty,
    pub(crate) speed_level: u8,
    pub(crate) uppercase: bool,
    pub(crate) duration_secs: u32,
    profile: &'static FireProfile,
    pub(crate) ramp: Ramp,
    pub(crate) phase: Phase,
    rng: StdRng,
    clock_ms: f64,
    pub(crate) letters: Vec<Letter>,
    pub(crate) queue: VecDeque<Letter>,
    pub(crate) bullets: Vec<Bullet>,
    pub(crate) bursts: Vec<Burst>,
    pub(crate) plane: Plane,
    last_spawn: Option<f64>,
    last_generation: Option<f64>,
    second: Repeating,
    pub(crate) remaining_secs: u32,
    last_ramp_at: u32,
    pub(crate) score: u32,
    pub(crate) tally: Tally,
    next_id: u64,
    pub(crate) best: u32,
    pub(crate) new_record: bool,
}

impl FireGame {
    pub fn new(settings: &Settings, best: u32) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        let profile = profile(settings.difficulty);
        Self {
            difficulty: settings.difficulty,
            speed_level: settings.speed_level,
            uppercase: settings.uppercase,
            duration_secs: settings.duration_secs,
            profile,
            ramp: Ramp::new(profile, settings.speed_level),
            phase: Phase::Ready,
            rng,
            clock_ms: 0.0,
            letters: Vec::new(),
            queue: VecDeque::new(),
            bullets: Vec::new(),
            bursts: Vec::new(),
            plane: Plane::centered(),
            last_spawn: None,
            last_generation: None,
            second: Repeating::new(1000),
            remaining_secs: settings.duration_secs,
            last_ramp_at: settings.duration_secs,
            score: 0,
            tally: Tally::default(),
            next_id: 0,
            best,
            new_record: false,
        }
    }

    /// Build from launch settings with the stored best for this board.
    pub fn load(settings: &Settings, storage: &Storage) -> Self {
        let best = storage.high_score(&format!("fire:{}", settings.difficulty));
        Self::new(settings, best)
    }

    pub fn board(&self) -> String {
        format!("fire:{}", self.difficulty)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn ramp(&self) -> &Ramp {
        &self.ramp
    }

    pub fn start(&mut self, ctx: &Context) {
        self.ramp = Ramp::new(self.profile, self.speed_level);
        self.phase = Phase::Playing;
        self.clock_ms = 0.0;
        self.letters.clear();
        self.queue.clear();
        self.bullets.clear();
        self.bursts.clear();
        self.plane = Plane::centered();
        self.last_spawn = None;
        self.last_generation = None;
        self.second.reset();
        self.remaining_secs = self.duration_secs;
        self.last_ramp_at = self.duration_secs;
        self.score = 0;
        self.tally = Tally::default();
        self.new_record = false;
        ctx.emit(GameEvent::Started { game: "fire", board: self.board() });
    }

    /// Line the plane up under the first on-screen letter matching `key`.
    pub fn press(&mut self, key: char, ctx: &Context) {
        if self.phase != Phase::Playing || self.plane.busy() {
            return;
        }
        let Some(target) = self.letters.iter().find(|l| l.ch.eq_ignore_ascii_case(&key)) else {
            ctx.emit(GameEvent::WrongKey(key));
            return;
        };
        self.plane.target_x = target.x + LETTER_SIZE / 2.0 - PLANE_WIDTH / 2.0;
        self.plane.moving = true;
        self.plane.target = Some(target.id);
    }

    fn tick_clock(&mut self, dt: u32, ctx: &Context) {
        for _ in 0..self.second.advance(dt) {
            self.remaining_secs = self.remaining_secs.saturating_sub(1);
            if self.last_ramp_at - self.remaining_secs >= self.profile.ramp_interval_secs {
                self.ramp.step();
                self.last_ramp_at = self.remaining_secs;
                ctx.emit(GameEvent::Ramp {
                    spawn_ms: self.ramp.spawn_rate.round() as u32,
                    speed: self.ramp.letter_speed,
                });
            }
            if self.remaining_secs == 0 {
                self.finish(ctx);
                return;
            }
        }
    }

    fn finish(&mut self, ctx: &Context) {
        self.phase = Phase::Over;
        self.queue.clear();
        ctx.emit(GameEvent::Finished(GameReport {
            game: "fire".into(),
            board: self.board(),
            score: self.score,
            hits: self.tally.hits,
            misses: self.tally.misses,
            elapsed_secs: self.duration_secs - self.remaining_secs,
        }));
    }

    fn random_letter(&mut self) -> Letter {
        let offset = self.rng.random_range(0..26u8);
        let base = if self.uppercase { b'A' } else { b'a' };
        let ch = (base + offset) as char;

        // Keep new letters apart from those already falling; give up after a while.
        let mut x = 0.0;
        for _ in 0..PLACEMENT_ATTEMPTS {
            x = self.rng.random::<f64>() * (FIELD_WIDTH - LETTER_SIZE);
            if !self.letters.iter().any(|l| (l.x - x).abs() < MIN_LETTER_GAP) {
                break;
            }
        }

        self.next_id += 1;
        Letter { id: self.next_id, ch, x, y: -LETTER_SIZE }
    }

    fn queue_letters(&mut self) {
        let cap = self.profile.max_letters_on_screen;
        if self.letters.len() + self.queue.len() >= cap {
            return;
        }
        let count = (self.rng.random::<f64>() * self.ramp.letters_per_spawn).floor() as usize + 1;
        for _ in 0..count {
            if self.letters.len() + self.queue.len() + 1 > cap {
                break;
            }
            let letter = self.random_letter();
            self.queue.push_back(letter);
        }
    }

    fn release_queued(&mut self, ctx: &Context) {
        if self.letters.len() >= self.profile.max_letters_on_screen {
            return;
        }
        if let Some(letter) = self.queue.pop_front() {
            ctx.emit(GameEvent::Spawned { letter: letter.ch });
            self.letters.push(letter);
            self.last_generation = Some(self.clock_ms);
        }
    }

    fn update(&mut self, dt: u32, ctx: &Context) {
        let frames = dt as f64 / FRAME_MS;

        if self.plane.moving {
            let dx = self.plane.target_x - self.plane.x;
            if dx.abs() < SNAP_DISTANCE {
                self.plane.x = self.plane.target_x;
                self.plane.moving = false;
                if let Some(target) = self.plane.target.take() {
                    self.fire_at(target);
                }
            } else {
                self.plane.x += dx * (self.ramp.plane_speed * frames).min(1.0);
            }
        }

        let jitter = self.rng.random_range(-SPAWN_JITTER_MS..SPAWN_JITTER_MS);
        let spawn_due = self
            .last_spawn
            .map_or(true, |t| self.clock_ms - t > self.ramp.spawn_rate + jitter);
        if spawn_due {
            self.queue_letters();
            self.last_spawn = Some(self.clock_ms);
        }

        let generation_due = self
            .last_generation
            .map_or(true, |t| self.clock_ms - t > self.profile.generation_delay);
        if generation_due && !self.queue.is_empty() {
            self.release_queued(ctx);
        }

        let speed = self.ramp.letter_speed;
        let mut fallen = Vec::new();
        for letter in &mut self.letters {
            let wobble = 1.0 + self.rng.random_range(-FALL_JITTER..FALL_JITTER);
            letter.y += speed * wobble * frames;
            if letter.y > FIELD_HEIGHT {
                fallen.push(letter.id);
            }
        }
        if !fallen.is_empty() {
            self.letters.retain(|l| {
                if fallen.contains(&l.id) {
                    ctx.emit(GameEvent::Miss { letter: l.ch });
                    false
                } else {
                    true
                }
            });
            for _ in &fallen {
                self.tally.miss();
            }
        }

        let bullet_speed = self.ramp.bullet_speed;
        let mut i = 0;
        while i < self.bullets.len() {
            self.bullets[i].y -= bullet_speed * frames;
            let bullet = &self.bullets[i];
            let struck = self
                .letters
                .iter()
                .position(|l| l.id == bullet.target && bullet.y <= l.y + LETTER_SIZE);
            if let Some(idx) = struck {
                let letter = self.letters.remove(idx);
                self.bursts.push(Burst {
                    x: letter.x + LETTER_SIZE / 2.0,
                    y: letter.y + LETTER_SIZE / 2.0,
                    ch: letter.ch,
                    life: Countdown::new(BURST_MS),
                });
                self.bullets.remove(i);
                self.score += POINTS_PER_HIT;
                self.tally.hit();
                ctx.emit(GameEvent::Hit { letter: letter.ch, points: POINTS_PER_HIT });
                continue;
            }
            if self.bullets[i].y < 0.0 {
                self.bullets.remove(i);
                continue;
            }
            i += 1;
        }

        self.bursts.retain_mut(|b| !b.life.advance(dt));
    }

    fn fire_at(&mut self, target: u64) {
        let ch = self
            .letters
            .iter()
            .find(|l| l.id == target)
            .map(|l| l.ch)
            .unwrap_or('*');
        debug!(target, %ch, "firing");
        self.bullets.push(Bullet {
            x: self.plane.x + PLANE_WIDTH / 2.0,
            y: PLANE_Y,
            ch,
            target,
        });
    }
}

impl Game for FireGame {
    fn on_tick(&mut self, dt: u32, ctx: &Context) {
        if self.phase != Phase::Playing {
            self.bursts.retain_mut(|b| !b.life.advance(dt));
            return;
        }
        self.clock_ms += dt as f64;
        self.tick_clock(dt, ctx);
        if self.phase == Phase::Playing {
            self.update(dt, ctx);
        }
    }

    fn handle_input(&mut self, event: KeyEvent, ctx: &Context) {
        match event.code {
            KeyCode::Enter if self.phase != Phase::Playing => self.start(ctx),
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.press(c, ctx),
            _ => {}
        }
    }

    fn handle_record(&mut self, outcome: RecordOutcome) {
        self.best = outcome.best;
        self.new_record = outcome.new_high_score;
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        FireRenderer::render(frame, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn game(difficulty: Difficulty, duration_secs: u32) -> FireGame {
        let settings = Settings {
            difficulty,
            duration_secs,
            seed: Some(7),
            ..Settings::default()
        };
        FireGame::new(&settings, 0)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn run(game: &mut FireGame, ctx: &Context, ms: u32) {
        for _ in 0..ms / 16 {
            game.on_tick(16, ctx);
        }
    }

    #[test]
    fn waits_for_enter() {
        let (ctx, _rx) = Context::channel();
        let mut g = game(Difficulty::Easy, 60);
        run(&mut g, &ctx, 2000);
        assert_eq!(g.phase(), Phase::Ready);
        assert!(g.letters().is_empty());

        g.handle_input(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &ctx);
        assert_eq!(g.phase(), Phase::Playing);
    }

    #[test]
    fn first_letter_arrives_immediately() {
        let (ctx, _rx) = Context::channel();
        let mut g = game(Difficulty::Medium, 60);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        assert_eq!(g.letters().len(), 1);
        assert!(g.letters()[0].ch.is_ascii_lowercase());
    }

    #[test]
    fn uppercase_setting_changes_letters() {
        let (ctx, _rx) = Context::channel();
        let settings = Settings { uppercase: true, seed: Some(3), ..Settings::default() };
        let mut g = FireGame::new(&settings, 0);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        assert!(g.letters()[0].ch.is_ascii_uppercase());
    }

    #[test]
    fn never_exceeds_screen_cap() {
        let (ctx, _rx) = Context::channel();
        let settings = Settings {
            difficulty: Difficulty::Hard,
            speed_level: 1,
            duration_secs: 180,
            seed: Some(11),
            ..Settings::default()
        };
        let mut g = FireGame::new(&settings, 0);
        g.start(&ctx);
        for _ in 0..(120_000 / 16) {
            g.on_tick(16, &ctx);
            assert!(g.letters().len() + g.queued() <= HARD_CAP);
        }
    }

    const HARD_CAP: usize = 20;

    #[test]
    fn typed_letter_is_shot_down() {
        let (ctx, mut rx) = Context::channel();
        let mut g = game(Difficulty::Easy, 60);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        let target = g.letters()[0].clone();

        g.handle_input(key(target.ch.to_ascii_uppercase()), &ctx);
        assert_eq!(g.plane.target, Some(target.id));

        run(&mut g, &ctx, 3000);
        assert_eq!(g.score(), 10);
        assert_eq!(g.tally().hits, 1);
        assert!(g.letters().iter().all(|l| l.id != target.id));

        let mut hit = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, GameEvent::Hit { points: 10, .. }) {
                hit = true;
            }
        }
        assert!(hit);
    }

    #[test]
    fn bullet_without_target_flies_off() {
        let (ctx, _rx) = Context::channel();
        let mut g = game(Difficulty::Easy, 60);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        let target = g.letters()[0].clone();
        g.press(target.ch, &ctx);

        // The letter drops out before the plane gets there.
        g.letters[0].y = FIELD_HEIGHT + 1.0;
        g.on_tick(16, &ctx);
        assert!(g.letters().iter().all(|l| l.id != target.id));
        assert_eq!(g.tally().misses, 1);

        run(&mut g, &ctx, 3000);
        assert!(g.plane.target.is_none());
        assert!(g.bullets.is_empty());
        assert_eq!(g.score(), 0);
        assert_eq!(g.tally().hits, 0);
    }

    #[test]
    fn ignores_keys_while_plane_is_busy() {
        let (ctx, _rx) = Context::channel();
        let mut g = game(Difficulty::Easy, 60);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        g.letters.push(Letter { id: 999, ch: 'q', x: 10.0, y: 100.0 });
        let first = g.letters()[0].clone();

        g.press(first.ch, &ctx);
        g.press('q', &ctx);
        assert_eq!(g.plane.target, Some(first.id));
    }

    #[test]
    fn fallen_letters_are_misses() {
        let (ctx, _rx) = Context::channel();
        let mut g = game(Difficulty::Easy, 60);
        g.start(&ctx);
        g.on_tick(16, &ctx);
        // Easy at level 5 falls 0.5 units a frame: about 20 seconds to cross.
        run(&mut g, &ctx, 25_000);
        assert!(g.tally().misses >= 1);
        assert_eq!(g.score(), 0);
    }

    #[test]
    fn ramps_on_interval_and_ends_at_zero() {
        let (ctx, mut rx) = Context::channel();
        let mut g = game(Difficulty::Hard, 30);
        g.start(&ctx);
        let spawn_rate = g.ramp().spawn_rate;

        run(&mut g, &ctx, 8_010);
        assert_eq!(g.remaining_secs(), 22);
        assert_eq!(g.ramp().spawn_rate, spawn_rate - 250.0);

        run(&mut g, &ctx, 23_000);
        assert_eq!(g.phase(), Phase::Over);
        assert_eq!(g.remaining_secs(), 0);

        let mut finished = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let GameEvent::Finished(report) = event {
                finished.push(report);
            }
        }
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].board, "fire:hard");
        assert_eq!(finished[0].elapsed_secs, 30);
    }

    #[test]
    fn record_outcome_is_kept() {
        let mut g = game(Difficulty::Easy, 30);
        g.handle_record(RecordOutcome { new_high_score: true, best: 120 });
        assert!(g.new_record);
        assert_eq!(g.best, 120);
    }
}
