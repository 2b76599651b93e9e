//! Sort order: numbered tiles appear shuffled; the player taps them in
//! ascending order. Every tap scores live, and a clean round earns a bonus.

use std::time::Duration;

use minigame_content::{ContentError, RandomSource, shuffled};
use minigame_engine::{GameAdapter, RoundOutcome, RoundTiming, ScorePolicy};
use serde::{Deserialize, Serialize};

pub struct SortOrder;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortExtras {
    /// Tiles per round.
    pub items: usize,
    pub points_per_item: i64,
    /// Deducted for a tap out of order.
    pub penalty: i64,
    /// Added when a round had no mistakes.
    pub clean_bonus: i64,
    pub cooldown_ms: u64,
}

impl Default for SortExtras {
    fn default() -> Self {
        Self {
            items: 5,
            points_per_item: 5,
            penalty: 5,
            clean_bonus: 10,
            cooldown_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortBoard {
    /// Tile labels in display order, a permutation of `1..=items`.
    pub values: Vec<u32>,
    /// How many tiles are already in place.
    pub sorted: u32,
    pub mistakes: u32,
}

impl SortBoard {
    /// Label of the tile expected next.
    pub fn expected(&self) -> u32 {
        self.sorted + 1
    }

    pub fn is_done(&self) -> bool {
        self.sorted as usize >= self.values.len()
    }
}

/// A tap on the tile at a display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tap(pub usize);

impl GameAdapter for SortOrder {
    type Extras = SortExtras;
    type Content = SortBoard;
    type Input = Tap;
    const NAME: &'static str = "sort_order";

    fn generate_content(
        extras: &SortExtras,
        _round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<SortBoard, ContentError> {
        if extras.items == 0 {
            return Err(ContentError::Empty("items"));
        }
        Ok(SortBoard {
            values: shuffled(rng, extras.items).into_iter().map(|v| v as u32 + 1).collect(),
            sorted: 0,
            mistakes: 0,
        })
    }

    fn round_timing(extras: &SortExtras, _rng: &mut dyn RandomSource) -> RoundTiming {
        RoundTiming {
            cooldown: Duration::from_millis(extras.cooldown_ms),
            ..RoundTiming::default()
        }
    }

    fn scoring(_extras: &SortExtras) -> ScorePolicy {
        ScorePolicy::live()
    }

    /// Taps on tiles already placed are ignored.
    fn validate_input(
        _extras: &SortExtras,
        board: &SortBoard,
        _collected: &[Tap],
        tap: &Tap,
    ) -> Result<(), String> {
        match board.values.get(tap.0) {
            None => Err(format!("no tile at position {}", tap.0)),
            Some(&v) if v <= board.sorted => Err(format!("tile {v} already placed")),
            Some(_) => Ok(()),
        }
    }

    fn apply_input(extras: &SortExtras, board: &mut SortBoard, _collected: &[Tap], tap: &Tap) -> i64 {
        if board.values[tap.0] == board.expected() {
            board.sorted += 1;
            extras.points_per_item
        } else {
            board.mistakes += 1;
            -extras.penalty
        }
    }

    fn is_satisfied(_extras: &SortExtras, board: &SortBoard, _collected: &[Tap]) -> bool {
        board.is_done()
    }

    fn resolve(extras: &SortExtras, board: &SortBoard, _collected: &[Tap]) -> RoundOutcome {
        if board.is_done() && board.mistakes == 0 {
            RoundOutcome::correct(extras.clean_bonus)
        } else {
            RoundOutcome::wrong(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(values: &[u32]) -> SortBoard {
        SortBoard {
            values: values.to_vec(),
            sorted: 0,
            mistakes: 0,
        }
    }

    #[test]
    fn test_in_order_taps_score() {
        let e = SortExtras::default();
        let mut b = board(&[3, 1, 2]);
        assert_eq!(SortOrder::apply_input(&e, &mut b, &[], &Tap(1)), 5);
        assert_eq!(SortOrder::apply_input(&e, &mut b, &[], &Tap(2)), 5);
        assert_eq!(SortOrder::apply_input(&e, &mut b, &[], &Tap(0)), 5);
        assert!(b.is_done());
        assert_eq!(SortOrder::resolve(&e, &b, &[]), RoundOutcome::correct(10));
    }

    #[test]
    fn test_out_of_order_tap_penalized() {
        let e = SortExtras::default();
        let mut b = board(&[3, 1, 2]);
        assert_eq!(SortOrder::apply_input(&e, &mut b, &[], &Tap(0)), -5);
        assert_eq!(b.mistakes, 1);
        assert_eq!(b.sorted, 0);
    }

    #[test]
    fn test_placed_tile_rejected() {
        let e = SortExtras::default();
        let mut b = board(&[2, 1]);
        SortOrder::apply_input(&e, &mut b, &[], &Tap(1));
        assert!(SortOrder::validate_input(&e, &b, &[], &Tap(1)).is_err());
        assert!(SortOrder::validate_input(&e, &b, &[], &Tap(5)).is_err());
        assert!(SortOrder::validate_input(&e, &b, &[], &Tap(0)).is_ok());
    }

    #[test]
    fn test_board_is_a_permutation() {
        let e = SortExtras {
            items: 6,
            ..SortExtras::default()
        };
        let mut rng = minigame_content::SequenceSource::new([0.9, 0.3, 0.6, 0.1, 0.75]);
        let mut values = SortOrder::generate_content(&e, 0, &mut rng).unwrap().values;
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3, 4, 5, 6]);
    }
}
