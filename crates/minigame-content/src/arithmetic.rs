//! Arithmetic quiz problems.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ContentError, RandomSource, sequence::shuffle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
        }
    }

    /// Saturates instead of overflowing.
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Self::Add => left.saturating_add(right),
            Self::Subtract => left.saturating_sub(right),
            Self::Multiply => left.saturating_mul(right),
        }
    }
}

/// Operand bounds for generated problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticParams {
    /// Largest operand for addition and subtraction.
    pub max_operand: i64,
    /// Largest factor for multiplication. Kept small so the quiz stays fair.
    pub max_factor: i64,
}

impl ArithmeticParams {
    /// Largest accepted operand or factor.
    pub const LIMIT: i64 = 1_000_000;

    /// Rejects bounds no problem can be drawn from, or that are too large.
    pub fn check(&self) -> Result<(), ContentError> {
        for (what, value) in [("max_operand", self.max_operand), ("max_factor", self.max_factor)] {
            if value < 1 {
                return Err(ContentError::Empty(what));
            }
            if value > Self::LIMIT {
                return Err(ContentError::TooLarge {
                    what,
                    max: Self::LIMIT,
                    got: value,
                });
            }
        }
        Ok(())
    }
}

impl Default for ArithmeticParams {
    fn default() -> Self {
        Self {
            max_operand: 20,
            max_factor: 10,
        }
    }
}

/// One `left op right = answer` problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub left: i64,
    pub right: i64,
    pub op: Operator,
    pub answer: i64,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op.symbol(), self.right)
    }
}

/// Generates a problem with a uniformly chosen operator.
///
/// Subtraction never goes negative: operands are ordered so `left >= right`.
pub fn arithmetic_problem<R>(rng: &mut R, params: ArithmeticParams) -> Result<Problem, ContentError>
where
    R: RandomSource + ?Sized,
{
    params.check()?;

    let op = Operator::ALL[rng.index(Operator::ALL.len())];
    let (left, right) = match op {
        Operator::Add => (
            rng.between(1, params.max_operand),
            rng.between(1, params.max_operand),
        ),
        Operator::Subtract => {
            let a = rng.between(1, params.max_operand);
            let b = rng.between(1, params.max_operand);
            (a.max(b), a.min(b))
        }
        Operator::Multiply => (
            rng.between(1, params.max_factor),
            rng.between(1, params.max_factor),
        ),
    };

    Ok(Problem {
        left,
        right,
        op,
        answer: op.apply(left, right),
    })
}

/// Largest accepted distance between a distractor and the answer.
pub const MAX_SPREAD: i64 = 1_000;

/// Checks that [`answer_choices`] can fill `count` options for every
/// answer, including 0 where only the upper side of `spread` is usable.
pub fn check_choices(count: usize, spread: i64) -> Result<(), ContentError> {
    if count == 0 {
        return Err(ContentError::Empty("choice count"));
    }
    if spread > MAX_SPREAD {
        return Err(ContentError::TooLarge {
            what: "spread",
            max: MAX_SPREAD,
            got: spread,
        });
    }
    let available = spread.max(0) as usize;
    if available < count - 1 {
        return Err(ContentError::NotEnough {
            wanted: count - 1,
            available,
        });
    }
    Ok(())
}

/// Multiple-choice options: the answer plus `count - 1` distinct,
/// non-negative distractors within `spread` of it, in shuffled order.
pub fn answer_choices<R>(rng: &mut R, answer: i64, count: usize, spread: i64) -> Result<Vec<i64>, ContentError>
where
    R: RandomSource + ?Sized,
{
    if count == 0 {
        return Err(ContentError::Empty("choice count"));
    }
    if spread > MAX_SPREAD {
        return Err(ContentError::TooLarge {
            what: "spread",
            max: MAX_SPREAD,
            got: spread,
        });
    }
    let lo = answer.saturating_sub(spread).max(0);
    let hi = answer.saturating_add(spread);
    let mut candidates: Vec<i64> = (lo..=hi)
        .filter(|&v| v != answer)
        .collect();
    if candidates.len() < count - 1 {
        return Err(ContentError::NotEnough {
            wanted: count - 1,
            available: candidates.len(),
        });
    }
    shuffle(rng, &mut candidates);
    candidates.truncate(count - 1);
    candidates.push(answer);
    shuffle(rng, &mut candidates);
    Ok(candidates)
}
