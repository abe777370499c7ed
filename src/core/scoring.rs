use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Percentage of attempts that were hits, rounded to the nearest integer.
pub fn accuracy(hits: u32, misses: u32) -> u32 {
    let total = hits as u64 + misses as u64;
    if total == 0 {
        return 0;
    }
    (hits as f64 / total as f64 * 100.0).round() as u32
}

/// Seconds as `M:SS`. Minutes are not wrapped into hours.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub hits: u32,
    pub misses: u32,
}

impl Tally {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn accuracy(&self) -> u32 {
        accuracy(self.hits, self.misses)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRating {
    KeepPracticing,
    KeepGoing,
    NiceWork,
    KeyboardExpert,
    SuperPro,
    LegendaryMaster,
}

impl ScoreRating {
    pub fn for_score(score: u32) -> Self {
        match score {
            1000.. => Self::LegendaryMaster,
            800.. => Self::SuperPro,
            600.. => Self::KeyboardExpert,
            400.. => Self::NiceWork,
            200.. => Self::KeepGoing,
            _ => Self::KeepPracticing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LegendaryMaster => "Legendary Master",
            Self::SuperPro => "Super Pro",
            Self::KeyboardExpert => "Keyboard Expert",
            Self::NiceWork => "Nice Work",
            Self::KeepGoing => "Keep Going",
            Self::KeepPracticing => "Keep Practicing",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::LegendaryMaster => "👑",
            Self::SuperPro => "🏆",
            Self::KeyboardExpert => "⭐",
            Self::NiceWork => "👍",
            Self::KeepGoing => "💪",
            Self::KeepPracticing => "🌱",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::LegendaryMaster => Color::Yellow,
            Self::SuperPro => Color::Magenta,
            Self::KeyboardExpert => Color::Blue,
            Self::NiceWork => Color::Green,
            Self::KeepGoing => Color::LightRed,
            Self::KeepPracticing => Color::Gray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accuracy_table() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(accuracy(10, 0), 100);
        assert_eq!(accuracy(0, 10), 0);
        assert_eq!(accuracy(7, 3), 70);
        assert_eq!(accuracy(1, 2), 33);
        assert_eq!(accuracy(2, 1), 67);
    }

    #[test]
    fn time_format() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(30), "0:30");
        assert_eq!(format_time(60), "1:00");
        assert_eq!(format_time(90), "1:30");
        assert_eq!(format_time(3661), "61:01");
    }

    #[test]
    fn ratings() {
        let cases = [
            (0, "Keep Practicing"),
            (150, "Keep Practicing"),
            (250, "Keep Going"),
            (450, "Nice Work"),
            (650, "Keyboard Expert"),
            (850, "Super Pro"),
            (1200, "Legendary Master"),
        ];
        for (score, label) in cases {
            assert_eq!(ScoreRating::for_score(score).label(), label, "score {score}");
        }
    }

    #[test]
    fn tally_tracks_accuracy() {
        let mut tally = Tally::default();
        tally.hit();
        tally.miss();
        tally.miss();
        assert_eq!(tally.accuracy(), 33);
    }
}
