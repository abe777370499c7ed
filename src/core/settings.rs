//! Launch settings shared by the lobby, the CLI and the games.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    #[serde(alias = "normal")]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}' (expected easy, medium or hard)")),
        }
    }
}

/// Durations offered for timed rounds, in seconds.
pub const DURATIONS: [u32; 5] = [30, 60, 90, 120, 180];

pub const MIN_SPEED_LEVEL: u8 = 1;
pub const MAX_SPEED_LEVEL: u8 = 10;

/// Which knobs a game exposes in the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Difficulty,
    SpeedLevel,
    LetterCase,
    Duration,
}

impl OptionKind {
    pub fn label(self) -> &'static str {
        match self {
            OptionKind::Difficulty => "Difficulty",
            OptionKind::SpeedLevel => "Speed level",
            OptionKind::LetterCase => "Letters",
            OptionKind::Duration => "Duration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub last_game: Option<String>,
    pub difficulty: Difficulty,
    pub speed_level: u8,
    pub uppercase: bool,
    pub duration_secs: u32,
    /// Fixed RNG seed; only ever set from the command line.
    #[serde(skip)]
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_game: None,
            difficulty: Difficulty::Easy,
            speed_level: 5,
            uppercase: false,
            duration_secs: 60,
            seed: None,
        }
    }
}

impl Settings {
    /// Clamp values that may have been hand-edited into range.
    pub fn normalized(mut self) -> Self {
        self.speed_level = self.speed_level.clamp(MIN_SPEED_LEVEL, MAX_SPEED_LEVEL);
        if self.duration_secs == 0 {
            self.duration_secs = 60;
        }
        self
    }

    pub fn value_of(&self, kind: OptionKind) -> String {
        match kind {
            OptionKind::Difficulty => self.difficulty.to_string(),
            OptionKind::SpeedLevel => self.speed_level.to_string(),
            OptionKind::LetterCase => if self.uppercase { "UPPER" } else { "lower" }.to_string(),
            OptionKind::Duration => format!("{}s", self.duration_secs),
        }
    }

    /// Step an option forward (`forward`) or backward, wrapping where it makes sense.
    pub fn cycle(&mut self, kind: OptionKind, forward: bool) {
        match kind {
            OptionKind::Difficulty => {
                self.difficulty = if forward { self.difficulty.next() } else { self.difficulty.prev() };
            }
            OptionKind::SpeedLevel => {
                self.speed_level = if forward {
                    (self.speed_level + 1).min(MAX_SPEED_LEVEL)
                } else {
                    self.speed_level.saturating_sub(1).max(MIN_SPEED_LEVEL)
                };
            }
            OptionKind::LetterCase => self.uppercase = !self.uppercase,
            OptionKind::Duration => {
                let idx = DURATIONS.iter().position(|d| *d == self.duration_secs).unwrap_or(1);
                let next = if forward {
                    (idx + 1) % DURATIONS.len()
                } else {
                    (idx + DURATIONS.len() - 1) % DURATIONS.len()
                };
                self.duration_secs = DURATIONS[next];
            }
        }
    }
}
