//! Pattern recall: a sequence of pads lights up, then the player repeats it.

use std::time::Duration;

use minigame_content::{ContentError, RandomSource, ordered_pattern};
use minigame_engine::{GameAdapter, RoundOutcome, RoundTiming, ScorePolicy};
use serde::{Deserialize, Serialize};

pub struct PatternRecall;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternExtras {
    /// Steps per pattern.
    pub length: usize,
    /// Number of pads the pattern draws from.
    pub pads: usize,
    pub points: i64,
    /// How long each step is shown.
    pub step_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for PatternExtras {
    fn default() -> Self {
        Self {
            length: 4,
            pads: 9,
            points: 20,
            step_ms: 600,
            cooldown_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternRound {
    pub pattern: Vec<usize>,
}

/// A pad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pad(pub usize);

/// Whether the presses so far already diverged from the pattern.
fn diverged(pattern: &[usize], presses: &[Pad]) -> bool {
    presses.iter().zip(pattern).any(|(press, &want)| press.0 != want)
}

impl GameAdapter for PatternRecall {
    type Extras = PatternExtras;
    type Content = PatternRound;
    type Input = Pad;
    const NAME: &'static str = "pattern_recall";

    fn generate_content(
        extras: &PatternExtras,
        _round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<PatternRound, ContentError> {
        Ok(PatternRound {
            pattern: ordered_pattern(rng, extras.length, extras.pads)?,
        })
    }

    fn round_timing(extras: &PatternExtras, _rng: &mut dyn RandomSource) -> RoundTiming {
        let showing = extras.step_ms.saturating_mul(extras.length as u64);
        RoundTiming {
            presenting: (showing > 0).then(|| Duration::from_millis(showing)),
            input_limit: None,
            cooldown: Duration::from_millis(extras.cooldown_ms),
        }
    }

    fn scoring(_extras: &PatternExtras) -> ScorePolicy {
        ScorePolicy::batch()
    }

    fn validate_input(
        extras: &PatternExtras,
        _round: &PatternRound,
        _collected: &[Pad],
        pad: &Pad,
    ) -> Result<(), String> {
        if pad.0 >= extras.pads {
            return Err(format!("pad {} out of range (pads: {})", pad.0, extras.pads));
        }
        Ok(())
    }

    /// Complete, or wrong at any step.
    fn is_satisfied(_extras: &PatternExtras, round: &PatternRound, collected: &[Pad]) -> bool {
        collected.len() >= round.pattern.len() || diverged(&round.pattern, collected)
    }

    fn resolve(extras: &PatternExtras, round: &PatternRound, collected: &[Pad]) -> RoundOutcome {
        if collected.len() == round.pattern.len() && !diverged(&round.pattern, collected) {
            RoundOutcome::correct(extras.points)
        } else {
            RoundOutcome::wrong(0)
        }
    }
}
