//! Rarity-weighted items for continuous "incoming item" games.

use serde::{Deserialize, Serialize};

use crate::{ContentError, RandomSource};

/// The two content pools a stream draws from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamPools {
    /// Number of desirable variants.
    pub desirable: usize,
    /// Number of undesirable variants.
    pub undesirable: usize,
    /// Probability that a spawn is desirable.
    pub p_desirable: f64,
}

impl Default for StreamPools {
    fn default() -> Self {
        Self {
            desirable: 6,
            undesirable: 3,
            p_desirable: 0.75,
        }
    }
}

/// One spawned item: which pool, and which variant within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamItem {
    pub desirable: bool,
    pub variant: usize,
}

/// Draws one item: desirable with probability `p_desirable`, then a
/// uniform variant from the chosen pool.
pub fn stream_item<R>(rng: &mut R, pools: StreamPools) -> Result<StreamItem, ContentError>
where
    R: RandomSource + ?Sized,
{
    if !(0.0..=1.0).contains(&pools.p_desirable) {
        return Err(ContentError::Probability(pools.p_desirable.to_string()));
    }
    let desirable = rng.chance(pools.p_desirable);
    let size = if desirable {
        pools.desirable
    } else {
        pools.undesirable
    };
    if size == 0 {
        return Err(ContentError::Empty(if desirable {
            "desirable pool"
        } else {
            "undesirable pool"
        }));
    }
    Ok(StreamItem {
        desirable,
        variant: rng.index(size),
    })
}
