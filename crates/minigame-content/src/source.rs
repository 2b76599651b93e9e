//! The random-number seam.
//!
//! Hosts hand the engine a uniform `[0, 1)` stream. Everything else in
//! this crate is derived from [`RandomSource::next_unit`], so a session is
//! fully reproducible from its source.

use std::collections::VecDeque;

/// A uniform random source over `[0, 1)`.
///
/// Blanket-implemented for every [`rand::Rng`], so `StdRng`, `ThreadRng`
/// and friends plug in directly.
pub trait RandomSource {
    /// Next value, uniform over `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "index() over an empty range");
        let u = self.next_unit().clamp(0.0, 1.0);
        ((u * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Uniform integer in `lo..=hi`.
    fn between(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo <= hi);
        let span = (hi - lo + 1) as usize;
        lo + self.index(span) as i64
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Replays a fixed list of unit values, cycling when exhausted.
///
/// Useful for kiosk replays and for tests that need exact content.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: VecDeque<f64>,
}

impl SequenceSource {
    /// Creates a source from unit values. Values are clamped into `[0, 1)`.
    /// An empty list behaves like a source that always returns `0.0`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values }
    }

    /// A source that picks index `i` out of `n` for each `(i, n)` pair.
    pub fn picking(picks: impl IntoIterator<Item = (usize, usize)>) -> Self {
        Self::new(picks.into_iter().map(|(i, n)| (i as f64 + 0.5) / n as f64))
    }
}

impl RandomSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_index_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 1..20 {
            for _ in 0..50 {
                assert!(rng.index(n) < n);
            }
        }
    }

    #[test]
    fn test_between_inclusive() {
        let mut src = SequenceSource::new([0.0, 0.999]);
        assert_eq!(src.between(3, 5), 3);
        assert_eq!(src.between(3, 5), 5);
    }

    #[test]
    fn test_sequence_cycles() {
        let mut src = SequenceSource::new([0.1, 0.2]);
        assert_eq!(src.next_unit(), 0.1);
        assert_eq!(src.next_unit(), 0.2);
        assert_eq!(src.next_unit(), 0.1);
    }

    #[test]
    fn test_picking_hits_exact_index() {
        let mut src = SequenceSource::picking([(2, 5), (0, 3), (6, 7)]);
        assert_eq!(src.index(5), 2);
        assert_eq!(src.index(3), 0);
        assert_eq!(src.index(7), 6);
    }

    #[test]
    fn test_empty_sequence_returns_zero() {
        let mut src = SequenceSource::new(Vec::<f64>::new());
        assert_eq!(src.next_unit(), 0.0);
        assert!(src.chance(0.5));
    }
}
