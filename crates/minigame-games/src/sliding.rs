//! Sliding puzzle: a scrambled `side × side` board is restored by swapping
//! neighbouring tiles. Fewer moves score more.

use std::time::Duration;

use minigame_content::{ContentError, Grid, RandomSource, is_solved, permutation_puzzle};
use minigame_engine::{GameAdapter, RoundOutcome, RoundTiming, ScorePolicy};
use serde::{Deserialize, Serialize};

pub struct SlidingPuzzle;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlidingExtras {
    pub side: usize,
    /// Random moves applied to the solved board.
    pub scramble_moves: usize,
    /// Score for a solve in zero moves.
    pub max_score: i64,
    /// Deducted per move.
    pub move_cost: i64,
    pub time_limit_ms: Option<u64>,
    pub cooldown_ms: u64,
}

impl Default for SlidingExtras {
    fn default() -> Self {
        Self {
            side: 3,
            scramble_moves: 24,
            max_score: 100,
            move_cost: 2,
            time_limit_ms: None,
            cooldown_ms: 1_500,
        }
    }
}

impl SlidingExtras {
    /// Score for a solve in `moves` moves. Never negative.
    pub fn score_for(&self, moves: u32) -> i64 {
        self.max_score
            .saturating_sub(self.move_cost.saturating_mul(moves as i64))
            .max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub side: usize,
    /// `tiles[cell]` is the tile at `cell`. Solved when `tiles[i] == i`.
    pub tiles: Vec<usize>,
    pub moves: u32,
}

/// Swap the tiles in two neighbouring cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap(pub usize, pub usize);

impl GameAdapter for SlidingPuzzle {
    type Extras = SlidingExtras;
    type Content = Board;
    type Input = Swap;
    const NAME: &'static str = "sliding_puzzle";

    fn generate_content(
        extras: &SlidingExtras,
        _round: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<Board, ContentError> {
        Ok(Board {
            side: extras.side,
            tiles: permutation_puzzle(rng, extras.side, extras.scramble_moves)?,
            moves: 0,
        })
    }

    fn round_timing(extras: &SlidingExtras, _rng: &mut dyn RandomSource) -> RoundTiming {
        RoundTiming {
            presenting: None,
            input_limit: extras.time_limit_ms.map(Duration::from_millis),
            cooldown: Duration::from_millis(extras.cooldown_ms),
        }
    }

    fn scoring(_extras: &SlidingExtras) -> ScorePolicy {
        ScorePolicy::batch()
    }

    fn validate_input(
        _extras: &SlidingExtras,
        board: &Board,
        _collected: &[Swap],
        swap: &Swap,
    ) -> Result<(), String> {
        let grid = Grid::new(board.side).map_err(|e| e.to_string())?;
        if swap.0 >= grid.cells() || swap.1 >= grid.cells() {
            return Err(format!("cell out of range in {swap:?}"));
        }
        if !grid.are_adjacent(swap.0, swap.1) {
            return Err(format!("cells {} and {} are not neighbours", swap.0, swap.1));
        }
        Ok(())
    }

    fn apply_input(_extras: &SlidingExtras, board: &mut Board, _collected: &[Swap], swap: &Swap) -> i64 {
        board.tiles.swap(swap.0, swap.1);
        board.moves += 1;
        0
    }

    fn is_satisfied(_extras: &SlidingExtras, board: &Board, _collected: &[Swap]) -> bool {
        is_solved(&board.tiles)
    }

    /// Unsolved at the time limit scores nothing.
    fn resolve(extras: &SlidingExtras, board: &Board, _collected: &[Swap]) -> RoundOutcome {
        if is_solved(&board.tiles) {
            RoundOutcome::correct(extras.score_for(board.moves))
        } else {
            RoundOutcome::wrong(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_decreases_with_moves_and_floors_at_zero() {
        let e = SlidingExtras::default();
        assert_eq!(e.score_for(0), 100);
        assert_eq!(e.score_for(10), 80);
        assert!(e.score_for(11) < e.score_for(10));
        assert_eq!(e.score_for(50), 0);
        assert_eq!(e.score_for(u32::MAX), 0);
    }

    #[test]
    fn test_only_neighbour_swaps_accepted() {
        let e = SlidingExtras::default();
        let board = Board {
            side: 3,
            tiles: (0..9).collect(),
            moves: 0,
        };
        assert!(SlidingPuzzle::validate_input(&e, &board, &[], &Swap(0, 1)).is_ok());
        assert!(SlidingPuzzle::validate_input(&e, &board, &[], &Swap(4, 7)).is_ok());
        assert!(SlidingPuzzle::validate_input(&e, &board, &[], &Swap(2, 3)).is_err());
        assert!(SlidingPuzzle::validate_input(&e, &board, &[], &Swap(0, 4)).is_err());
        assert!(SlidingPuzzle::validate_input(&e, &board, &[], &Swap(8, 9)).is_err());
    }

    #[test]
    fn test_swap_counts_moves() {
        let e = SlidingExtras::default();
        let mut board = Board {
            side: 2,
            tiles: vec![1, 0, 2, 3],
            moves: 0,
        };
        assert_eq!(SlidingPuzzle::apply_input(&e, &mut board, &[], &Swap(0, 1)), 0);
        assert_eq!(board.moves, 1);
        assert!(SlidingPuzzle::is_satisfied(&e, &board, &[]));
        assert_eq!(SlidingPuzzle::resolve(&e, &board, &[]), RoundOutcome::correct(98));
    }

    #[test]
    fn test_generated_board_is_scrambled() {
        let e = SlidingExtras::default();
        let mut rng = minigame_content::SequenceSource::new([0.05, 0.6, 0.45, 0.8, 0.3]);
        let board = SlidingPuzzle::generate_content(&e, 0, &mut rng).unwrap();
        assert_eq!(board.tiles.len(), 9);
        assert!(!is_solved(&board.tiles));
    }
}
