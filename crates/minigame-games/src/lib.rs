//! Concrete mini-games for the minigame session engine.
//!
//! Each game is a [`GameAdapter`](minigame_engine::GameAdapter) marker type
//! with its own extras, content and input types:
//!
//! | game | bound | scoring |
//! |---|---|---|
//! | [`PatternRecall`] | rounds | batch, per correct round |
//! | [`ComboMatch`] | rounds | batch, per correct round |
//! | [`MathQuiz`] | rounds or duration | batch, per correct answer |
//! | [`SortOrder`] | rounds | live, per tap, floor 0 |
//! | [`SlidingPuzzle`] | rounds | batch, fewer moves score more |
//! | [`Collector`] | duration | live, per catch, floor 0 |
//!
//! [`GameKind`] names them for hosts that pick a game from configuration.

mod collector;
mod combo;
mod math;
mod pattern;
mod sliding;
mod sort;

use std::fmt;
use std::str::FromStr;

use minigame_engine::RawSessionConfig;
use serde::{Deserialize, Serialize};

pub use collector::{Catch, Collector, CollectorExtras, Field, FieldItem};
pub use combo::{ComboExtras, ComboMatch, ComboRound, Pick};
pub use math::{Answer, MathExtras, MathQuiz, Question};
pub use pattern::{Pad, PatternExtras, PatternRecall, PatternRound};
pub use sliding::{Board, SlidingExtras, SlidingPuzzle, Swap};
pub use sort::{SortBoard, SortExtras, SortOrder, Tap};

/// Every game in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    PatternRecall,
    ComboMatch,
    MathQuiz,
    SortOrder,
    SlidingPuzzle,
    Collector,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        Self::PatternRecall,
        Self::ComboMatch,
        Self::MathQuiz,
        Self::SortOrder,
        Self::SlidingPuzzle,
        Self::Collector,
    ];

    /// The adapter's `NAME`.
    pub fn name(self) -> &'static str {
        use minigame_engine::GameAdapter;
        match self {
            Self::PatternRecall => PatternRecall::NAME,
            Self::ComboMatch => ComboMatch::NAME,
            Self::MathQuiz => MathQuiz::NAME,
            Self::SortOrder => SortOrder::NAME,
            Self::SlidingPuzzle => SlidingPuzzle::NAME,
            Self::Collector => Collector::NAME,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::PatternRecall => "Watch the pads light up, then repeat the sequence",
            Self::ComboMatch => "Remember which slots flashed and pick them all",
            Self::MathQuiz => "Solve each problem before the timer runs out",
            Self::SortOrder => "Tap the numbered tiles in ascending order",
            Self::SlidingPuzzle => "Restore the board by swapping neighbouring tiles",
            Self::Collector => "Catch the good items and dodge the hazards",
        }
    }

    /// A sensible configuration for a kiosk session.
    pub fn default_config(self) -> RawSessionConfig {
        match self {
            Self::PatternRecall | Self::ComboMatch => RawSessionConfig::rounds(5),
            Self::MathQuiz => RawSessionConfig::rounds(10),
            Self::SortOrder => RawSessionConfig::rounds(3),
            Self::SlidingPuzzle => RawSessionConfig::rounds(1),
            Self::Collector => RawSessionConfig::duration(30),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A game name that matches no [`GameKind`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game: {0:?}")]
pub struct UnknownGame(pub String);

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(kind.name().parse::<GameKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!(
            "tetris".parse::<GameKind>(),
            Err(UnknownGame("tetris".into()))
        );
    }

    #[test]
    fn test_default_configs_are_valid() {
        for kind in GameKind::ALL {
            let cfg = kind.default_config();
            assert!(cfg.round_count.is_some() != cfg.duration_seconds.is_some(), "{kind}");
        }
    }

    #[test]
    fn test_serde_name_matches_adapter_name() {
        for kind in GameKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.name());
        }
    }
}
