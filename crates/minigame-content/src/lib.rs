//! Randomized round content for mini-games.
//!
//! Every generator is deterministic given a [`RandomSource`], so a session
//! replays exactly when its source does.
//!
//! # Key items
//!
//! - [`RandomSource`]: the host's uniform `[0, 1)` stream
//! - [`generate`]: one entry point over every [`ContentSpec`]
//! - per-kind generators: [`ordered_pattern`], [`target_subset`],
//!   [`permutation_puzzle`], [`arithmetic_problem`], [`stream_item`]

mod arithmetic;
mod error;
mod puzzle;
mod sequence;
mod source;
mod stream;

use serde::{Deserialize, Serialize};

pub use arithmetic::{
    ArithmeticParams, MAX_SPREAD, Operator, Problem, answer_choices, arithmetic_problem, check_choices,
};
pub use error::ContentError;
pub use puzzle::{Grid, is_solved, permutation_puzzle};
pub use sequence::{ordered_pattern, shuffle, shuffled, target_subset};
pub use source::{RandomSource, SequenceSource};
pub use stream::{StreamItem, StreamPools, stream_item};

/// What to generate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentSpec {
    Pattern { length: usize, alphabet: usize },
    Subset { n: usize, k: usize },
    Puzzle { side: usize, scramble_moves: usize },
    Arithmetic(ArithmeticParams),
    Stream(StreamPools),
}

/// Generated content, one variant per [`ContentSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    Pattern(Vec<usize>),
    Subset(Vec<usize>),
    Puzzle(Vec<usize>),
    Arithmetic(Problem),
    Stream(StreamItem),
}

/// Generates content for `spec`.
pub fn generate<R>(spec: ContentSpec, rng: &mut R) -> Result<Content, ContentError>
where
    R: RandomSource + ?Sized,
{
    let content = match spec {
        ContentSpec::Pattern { length, alphabet } => {
            Content::Pattern(ordered_pattern(rng, length, alphabet)?)
        }
        ContentSpec::Subset { n, k } => Content::Subset(target_subset(rng, n, k)?),
        ContentSpec::Puzzle {
            side,
            scramble_moves,
        } => Content::Puzzle(permutation_puzzle(rng, side, scramble_moves)?),
        ContentSpec::Arithmetic(params) => Content::Arithmetic(arithmetic_problem(rng, params)?),
        ContentSpec::Stream(pools) => Content::Stream(stream_item(rng, pools)?),
    };
    tracing::trace!(?spec, "content generated");
    Ok(content)
}
