//! Combo match: a few slots flash, then the player picks the same ones in
//! any order.

use std::time::Duration;

use minigame_content::{ContentError, RandomSource, target_subset};
use minigame_engine::{GameAdapter, RoundOutcome, RoundTiming, ScorePolicy};
use serde::{Deserialize, Serialize};

pub struct ComboMatch;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComboExtras {
    /// Slots on the board.
    pub slots: usize,
    /// Slots in the combo.
    pub targets: usize,
    pub points: i64,
    pub presenting_ms: u64,
    pub cooldown_ms: u64,
}

impl Default for ComboExtras {
    fn default() -> Self {
        Self {
            slots: 9,
            targets: 3,
            points: 30,
            presenting_ms: 1_500,
            cooldown_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboRound {
    pub slots: usize,
    /// Sorted slot indices.
    pub target: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick(pub usize);

impl GameAdapter for ComboMatch {
    type Extras = ComboExtras;
    type Content = ComboRound;
    type Input = Pick;
    const NAME: &'static str = "combo_match";

    fn generate_content(
        extras: &ComboExtras,
        _round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<ComboRound, ContentError> {
        Ok(ComboRound {
            slots: extras.slots,
            target: target_subset(rng, extras.slots, extras.targets)?,
        })
    }

    fn round_timing(extras: &ComboExtras, _rng: &mut dyn RandomSource) -> RoundTiming {
        RoundTiming {
            presenting: Some(Duration::from_millis(extras.presenting_ms)),
            input_limit: None,
            cooldown: Duration::from_millis(extras.cooldown_ms),
        }
    }

    fn scoring(_extras: &ComboExtras) -> ScorePolicy {
        ScorePolicy::batch()
    }

    fn validate_input(
        _extras: &ComboExtras,
        round: &ComboRound,
        collected: &[Pick],
        pick: &Pick,
    ) -> Result<(), String> {
        if pick.0 >= round.slots {
            return Err(format!("slot {} out of range", pick.0));
        }
        if collected.contains(pick) {
            return Err(format!("slot {} already picked", pick.0));
        }
        Ok(())
    }

    fn is_satisfied(_extras: &ComboExtras, round: &ComboRound, collected: &[Pick]) -> bool {
        collected.len() >= round.target.len()
    }

    /// Order doesn't matter: picks are compared sorted.
    fn resolve(extras: &ComboExtras, round: &ComboRound, collected: &[Pick]) -> RoundOutcome {
        let mut picked: Vec<usize> = collected.iter().map(|p| p.0).collect();
        picked.sort_unstable();
        if picked == round.target {
            RoundOutcome::correct(extras.points)
        } else {
            RoundOutcome::wrong(0)
        }
    }
}
