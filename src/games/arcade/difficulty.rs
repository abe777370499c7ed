use crate::core::settings::Difficulty;

/// Timing and scoring for one Whack-a-Letter difficulty.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcadeProfile {
    pub label: &'static str,
    pub blurb: &'static str,
    pub spawn_interval_ms: u32,
    pub mole_lifetime_ms: u32,
    pub points_per_hit: u32,
    /// Divisor applied to the speed every ramp; below 1 means faster.
    pub speed_increase: f64,
    pub max_concurrent: usize,
}

pub const EASY: ArcadeProfile = ArcadeProfile {
    label: "Easy",
    blurb: "Slow moles, good for warming up",
    spawn_interval_ms: 2000,
    mole_lifetime_ms: 3000,
    points_per_hit: 10,
    speed_increase: 0.95,
    max_concurrent: 3,
};

pub const MEDIUM: ArcadeProfile = ArcadeProfile {
    label: "Medium",
    blurb: "A fair challenge",
    spawn_interval_ms: 1500,
    mole_lifetime_ms: 2500,
    points_per_hit: 15,
    speed_increase: 0.9,
    max_concurrent: 4,
};

pub const HARD: ArcadeProfile = ArcadeProfile {
    label: "Hard",
    blurb: "Fast moles, test your limits",
    spawn_interval_ms: 1000,
    mole_lifetime_ms: 2000,
    points_per_hit: 20,
    speed_increase: 0.85,
    max_concurrent: 5,
};

pub fn profile(difficulty: Difficulty) -> &'static ArcadeProfile {
    match difficulty {
        Difficulty::Easy => &EASY,
        Difficulty::Medium => &MEDIUM,
        Difficulty::Hard => &HARD,
    }
}

pub const MAX_SPEED: f64 = 3.0;
pub const RAMP_EVERY_MS: u32 = 10_000;

/// Next speed after a ramp, capped at [`MAX_SPEED`].
pub fn ramp_speed(speed: f64, profile: &ArcadeProfile) -> f64 {
    (speed / profile.speed_increase).min(MAX_SPEED)
}

/// Scale a base duration by the current speed.
pub fn scaled(ms: u32, speed: f64) -> u32 {
    ((ms as f64 / speed).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tables_are_ordered() {
        let [easy, medium, hard] = Difficulty::ALL.map(profile);
        assert!(easy.spawn_interval_ms > medium.spawn_interval_ms);
        assert!(medium.spawn_interval_ms > hard.spawn_interval_ms);
        assert!(easy.mole_lifetime_ms > hard.mole_lifetime_ms);
        assert!(easy.points_per_hit < hard.points_per_hit);
        for p in [easy, medium, hard] {
            assert!(p.speed_increase > 0.0 && p.speed_increase < 1.0);
        }
    }

    #[test]
    fn speed_caps_at_three() {
        let mut speed = 1.0;
        for _ in 0..50 {
            speed = ramp_speed(speed, &HARD);
        }
        assert_eq!(speed, MAX_SPEED);
    }

    #[test]
    fn scaling() {
        assert_eq!(scaled(2000, 1.0), 2000);
        assert_eq!(scaled(3000, 3.0), 1000);
        assert_eq!(scaled(1500, 1.0 / 0.9), 1350);
    }
}
