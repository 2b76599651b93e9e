//! Sequence content: recall patterns, target subsets, shuffles.
//!
//! Written against [`RandomSource`] rather than `rand::seq`, since a host
//! may supply a bare `[0, 1)` stream that is not a `rand::Rng`.

use crate::{ContentError, RandomSource};

/// Uniform sequence of `length` symbols drawn with replacement from
/// `0..alphabet`. Used by memorize-and-repeat games.
pub fn ordered_pattern<R>(rng: &mut R, length: usize, alphabet: usize) -> Result<Vec<usize>, ContentError>
where
    R: RandomSource + ?Sized,
{
    if length == 0 {
        return Err(ContentError::Empty("pattern length"));
    }
    if alphabet == 0 {
        return Err(ContentError::Empty("pattern alphabet"));
    }
    Ok((0..length).map(|_| rng.index(alphabet)).collect())
}

/// `k` distinct indices out of `0..n`, sorted ascending.
///
/// Order carries no meaning for "match the combo" games, so the result is
/// sorted to make comparison against player input a plain equality check.
pub fn target_subset<R>(rng: &mut R, n: usize, k: usize) -> Result<Vec<usize>, ContentError>
where
    R: RandomSource + ?Sized,
{
    if k == 0 {
        return Err(ContentError::Empty("subset size"));
    }
    if k > n {
        return Err(ContentError::NotEnough {
            wanted: k,
            available: n,
        });
    }
    // Partial Fisher-Yates: only the first k slots need to be drawn.
    let mut pool: Vec<usize> = (0..n).collect();
    for i in 0..k {
        let j = i + rng.index(n - i);
        pool.swap(i, j);
    }
    pool.truncate(k);
    pool.sort_unstable();
    Ok(pool)
}

/// In-place Fisher-Yates shuffle.
pub fn shuffle<T, R>(rng: &mut R, items: &mut [T])
where
    R: RandomSource + ?Sized,
{
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// A shuffled copy of `0..n`.
pub fn shuffled<R>(rng: &mut R, n: usize) -> Vec<usize>
where
    R: RandomSource + ?Sized,
{
    let mut items: Vec<usize> = (0..n).collect();
    shuffle(rng, &mut items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequenceSource;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pattern_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = ordered_pattern(&mut rng, 6, 4).unwrap();
        assert_eq!(p.len(), 6);
        assert!(p.iter().all(|&s| s < 4));
    }

    #[test]
    fn test_pattern_allows_repeats() {
        let mut src = SequenceSource::picking([(1, 3), (1, 3), (1, 3)]);
        assert_eq!(ordered_pattern(&mut src, 3, 3).unwrap(), vec![1, 1, 1]);
    }

    #[test]
    fn test_pattern_rejects_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(ordered_pattern(&mut rng, 0, 4).is_err());
        assert!(ordered_pattern(&mut rng, 3, 0).is_err());
    }

    #[test]
    fn test_subset_is_sorted_and_distinct() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let s = target_subset(&mut rng, 9, 4).unwrap();
            assert_eq!(s.len(), 4);
            assert!(s.windows(2).all(|w| w[0] < w[1]));
            assert!(s.iter().all(|&i| i < 9));
        }
    }

    #[test]
    fn test_subset_of_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(target_subset(&mut rng, 5, 5).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_subset_rejects_k_over_n() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            target_subset(&mut rng, 3, 4),
            Err(ContentError::NotEnough {
                wanted: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_shuffled_is_permutation() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = shuffled(&mut rng, 10);
        s.sort_unstable();
        assert_eq!(s, (0..10).collect::<Vec<_>>());
    }
}
