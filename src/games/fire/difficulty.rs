use crate::core::settings::{Difficulty, MAX_SPEED_LEVEL, MIN_SPEED_LEVEL};

/// Tuning for one difficulty of Letter Fire. Speeds are field units per
/// 60 fps frame, rates are milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct FireProfile {
    pub initial_letter_speed: f64,
    pub max_letter_speed: f64,
    pub initial_spawn_rate: f64,
    pub min_spawn_rate: f64,
    pub speed_increase: f64,
    pub spawn_rate_decrease: f64,
    pub initial_letters_per_spawn: f64,
    pub max_letters_per_spawn: f64,
    pub max_letters_on_screen: usize,
    pub ramp_interval_secs: u32,
    pub generation_delay: f64,
}

pub const EASY: FireProfile = FireProfile {
    initial_letter_speed: 0.5,
    max_letter_speed: 1.2,
    initial_spawn_rate: 5000.0,
    min_spawn_rate: 3000.0,
    speed_increase: 0.08,
    spawn_rate_decrease: 100.0,
    initial_letters_per_spawn: 1.0,
    max_letters_per_spawn: 2.0,
    max_letters_on_screen: 6,
    ramp_interval_secs: 20,
    generation_delay: 800.0,
};

pub const MEDIUM: FireProfile = FireProfile {
    initial_letter_speed: 0.7,
    max_letter_speed: 1.8,
    initial_spawn_rate: 3500.0,
    min_spawn_rate: 2000.0,
    speed_increase: 0.12,
    spawn_rate_decrease: 150.0,
    initial_letters_per_spawn: 1.0,
    max_letters_per_spawn: 3.0,
    max_letters_on_screen: 10,
    ramp_interval_secs: 15,
    generation_delay: 600.0,
};

pub const HARD: FireProfile = FireProfile {
    initial_letter_speed: 1.2,
    max_letter_speed: 3.0,
    initial_spawn_rate: 2000.0,
    min_spawn_rate: 800.0,
    speed_increase: 0.25,
    spawn_rate_decrease: 250.0,
    initial_letters_per_spawn: 2.0,
    max_letters_per_spawn: 5.0,
    max_letters_on_screen: 20,
    ramp_interval_secs: 8,
    generation_delay: 400.0,
};

pub fn profile(difficulty: Difficulty) -> &'static FireProfile {
    match difficulty {
        Difficulty::Easy => &EASY,
        Difficulty::Medium => &MEDIUM,
        Difficulty::Hard => &HARD,
    }
}

const SPEED_MULTIPLIERS: [f64; 10] = [0.4, 0.6, 0.8, 0.9, 1.0, 1.2, 1.4, 1.7, 2.0, 2.5];

const BASE_PLANE_SPEED: f64 = 0.4;
const BASE_BULLET_SPEED: f64 = 15.0;

pub fn speed_multiplier(level: u8) -> f64 {
    let level = level.clamp(MIN_SPEED_LEVEL, MAX_SPEED_LEVEL);
    SPEED_MULTIPLIERS[(level - 1) as usize]
}

/// Live difficulty values that tighten as a round goes on.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp {
    pub letter_speed: f64,
    pub max_letter_speed: f64,
    pub spawn_rate: f64,
    pub min_spawn_rate: f64,
    pub letters_per_spawn: f64,
    pub max_letters_per_spawn: f64,
    pub plane_speed: f64,
    pub bullet_speed: f64,
    speed_increase: f64,
    spawn_rate_decrease: f64,
}

impl Ramp {
    pub fn new(profile: &FireProfile, speed_level: u8) -> Self {
        let m = speed_multiplier(speed_level);
        // Fast levels scale movement by the square root so the plane stays controllable.
        let motion = if m > 1.0 { m.sqrt() } else { m };
        Self {
            letter_speed: profile.initial_letter_speed * m,
            max_letter_speed: profile.max_letter_speed * m,
            spawn_rate: profile.initial_spawn_rate / m,
            min_spawn_rate: profile.min_spawn_rate / m,
            letters_per_spawn: profile.initial_letters_per_spawn,
            max_letters_per_spawn: profile.max_letters_per_spawn,
            plane_speed: BASE_PLANE_SPEED * motion,
            bullet_speed: BASE_BULLET_SPEED * motion,
            speed_increase: profile.speed_increase,
            spawn_rate_decrease: profile.spawn_rate_decrease,
        }
    }

    /// One notch harder. Each value moves toward its cap and stops there.
    pub fn step(&mut self) {
        if self.letter_speed < self.max_letter_speed {
            self.letter_speed = (self.letter_speed + self.speed_increase).min(self.max_letter_speed);
        }
        if self.spawn_rate > self.min_spawn_rate {
            self.spawn_rate = (self.spawn_rate - self.spawn_rate_decrease).max(self.min_spawn_rate);
        }
        if self.letters_per_spawn < self.max_letters_per_spawn {
            self.letters_per_spawn = (self.letters_per_spawn + 0.5).min(self.max_letters_per_spawn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn profiles_get_harder() {
        assert!(EASY.initial_spawn_rate > MEDIUM.initial_spawn_rate);
        assert!(MEDIUM.initial_spawn_rate > HARD.initial_spawn_rate);
        assert!(EASY.max_letters_on_screen < HARD.max_letters_on_screen);
        assert!(EASY.ramp_interval_secs > HARD.ramp_interval_secs);
    }

    #[test]
    fn default_level_is_neutral() {
        let ramp = Ramp::new(&MEDIUM, 5);
        assert_eq!(ramp.letter_speed, 0.7);
        assert_eq!(ramp.spawn_rate, 3500.0);
        assert_eq!(ramp.plane_speed, 0.4);
        assert_eq!(ramp.bullet_speed, 15.0);
    }

    #[test]
    fn slow_levels_stretch_spawn_rate() {
        let ramp = Ramp::new(&EASY, 1);
        assert!((ramp.spawn_rate - 12_500.0).abs() < 1e-9);
        assert!((ramp.min_spawn_rate - 7_500.0).abs() < 1e-9);
        assert!((ramp.plane_speed - 0.16).abs() < 1e-9);
    }

    #[test]
    fn fast_levels_use_sqrt_for_motion() {
        let ramp = Ramp::new(&HARD, 10);
        assert!((ramp.bullet_speed - 15.0 * 2.5f64.sqrt()).abs() < 1e-9);
        assert!((ramp.letter_speed - 3.0).abs() < 1e-9);
    }

    #[test]
    fn ramp_clamps_at_caps() {
        let mut ramp = Ramp::new(&EASY, 5);
        for _ in 0..100 {
            ramp.step();
        }
        assert_eq!(ramp.letter_speed, 1.2);
        assert_eq!(ramp.spawn_rate, 3000.0);
        assert_eq!(ramp.letters_per_spawn, 2.0);
    }

    #[test]
    fn single_step() {
        let mut ramp = Ramp::new(&MEDIUM, 5);
        ramp.step();
        assert!((ramp.letter_speed - 0.82).abs() < 1e-9);
        assert_eq!(ramp.spawn_rate, 3350.0);
        assert_eq!(ramp.letters_per_spawn, 1.5);
    }
}
