//! Sliding-tile permutation puzzles.
//!
//! A board is a `side × side` grid holding a permutation of `0..side²`
//! in row-major order. A move swaps two orthogonally adjacent cells.
//! Adjacent transpositions generate every permutation, and boards are
//! produced by walking valid moves away from the solved state, so every
//! generated board is solvable by construction.

use crate::{ContentError, RandomSource};

/// Geometry of a square puzzle grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    side: usize,
}

impl Grid {
    pub fn new(side: usize) -> Result<Self, ContentError> {
        if side < 2 {
            return Err(ContentError::PuzzleTooSmall(side));
        }
        Ok(Self { side })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn cells(&self) -> usize {
        self.side * self.side
    }

    /// Orthogonal neighbours of `cell`.
    pub fn neighbours(&self, cell: usize) -> Vec<usize> {
        let (row, col) = (cell / self.side, cell % self.side);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(cell - self.side);
        }
        if row + 1 < self.side {
            out.push(cell + self.side);
        }
        if col > 0 {
            out.push(cell - 1);
        }
        if col + 1 < self.side {
            out.push(cell + 1);
        }
        out
    }

    /// Whether `a` and `b` are distinct, in-bounds, orthogonal neighbours.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        a < self.cells() && b < self.cells() && self.neighbours(a).contains(&b)
    }
}

/// Whether the tiles are in solved order `[0, 1, .., n-1]`.
pub fn is_solved(tiles: &[usize]) -> bool {
    tiles.iter().enumerate().all(|(i, &t)| i == t)
}

/// Generates a scrambled, never-solved board by applying `moves` random
/// adjacent swaps to the solved board.
pub fn permutation_puzzle<R>(rng: &mut R, side: usize, moves: usize) -> Result<Vec<usize>, ContentError>
where
    R: RandomSource + ?Sized,
{
    let grid = Grid::new(side)?;
    let mut tiles: Vec<usize> = (0..grid.cells()).collect();

    for _ in 0..moves {
        let cell = rng.index(grid.cells());
        let neighbours = grid.neighbours(cell);
        let other = neighbours[rng.index(neighbours.len())];
        tiles.swap(cell, other);
    }

    // The walk can wander back home; one more move always leaves it.
    if is_solved(&tiles) {
        tiles.swap(0, 1);
    }

    tracing::trace!(side, moves, "puzzle generated");
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_grid_neighbours_corner_edge_center() {
        let g = Grid::new(3).unwrap();
        let mut corner = g.neighbours(0);
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 3]);

        let mut edge = g.neighbours(1);
        edge.sort_unstable();
        assert_eq!(edge, vec![0, 2, 4]);

        let mut center = g.neighbours(4);
        center.sort_unstable();
        assert_eq!(center, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_row_wrap_is_not_adjacent() {
        let g = Grid::new(3).unwrap();
        assert!(g.are_adjacent(0, 1));
        assert!(g.are_adjacent(1, 4));
        assert!(!g.are_adjacent(2, 3), "end of row 0 and start of row 1");
        assert!(!g.are_adjacent(0, 0));
        assert!(!g.are_adjacent(8, 9));
    }

    #[test]
    fn test_grid_too_small() {
        assert_eq!(Grid::new(1), Err(ContentError::PuzzleTooSmall(1)));
    }

    #[test]
    fn test_puzzle_is_permutation_and_unsolved() {
        let mut rng = StdRng::seed_from_u64(77);
        for moves in [0, 1, 2, 50] {
            let tiles = permutation_puzzle(&mut rng, 3, moves).unwrap();
            let mut sorted = tiles.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..9).collect::<Vec<_>>());
            assert!(!is_solved(&tiles), "moves={moves} produced a solved board");
        }
    }

    #[test]
    fn test_is_solved() {
        assert!(is_solved(&[0, 1, 2, 3]));
        assert!(!is_solved(&[1, 0, 2, 3]));
    }
}
