//! Score accumulation.

use serde::{Deserialize, Serialize};

/// When recorded deltas reach the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStyle {
    /// Every delta hits the total immediately (event-driven games).
    #[default]
    Live,
    /// Deltas are staged and land at the round boundary.
    Batch,
}

/// How a game scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    /// Lowest value the total may reach. `None` disables clamping.
    pub floor: Option<i64>,
    pub commit: CommitStyle,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            floor: Some(0),
            commit: CommitStyle::Live,
        }
    }
}

impl ScorePolicy {
    /// Batch commits, clamped at zero.
    pub fn batch() -> Self {
        Self {
            commit: CommitStyle::Batch,
            ..Self::default()
        }
    }

    /// Live commits, clamped at zero.
    pub fn live() -> Self {
        Self::default()
    }

    /// Same commit style, no floor.
    pub fn unclamped(self) -> Self {
        Self {
            floor: None,
            ..self
        }
    }
}

/// Running score for one session.
///
/// The only writer of the total. Clamping happens right after each applied
/// delta, never deferred to the end of the session.
#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    total: i64,
    pending: i64,
    policy: ScorePolicy,
    applied: u64,
}

impl ScoreAccumulator {
    pub fn new(policy: ScorePolicy) -> Self {
        Self {
            total: 0,
            pending: 0,
            policy,
            applied: 0,
        }
    }

    /// Applies `delta` to the total now, then clamps. Returns the new total.
    pub fn apply(&mut self, delta: i64) -> i64 {
        self.total = self.total.saturating_add(delta);
        if let Some(floor) = self.policy.floor {
            if self.total < floor {
                tracing::trace!(total = self.total, floor, "score clamped");
                self.total = floor;
            }
        }
        self.applied += 1;
        self.total
    }

    /// Stages `delta` until the next [`commit`](Self::commit).
    pub fn stage(&mut self, delta: i64) {
        self.pending = self.pending.saturating_add(delta);
    }

    /// Applies everything staged as one delta. Returns the new total.
    pub fn commit(&mut self) -> i64 {
        let delta = std::mem::take(&mut self.pending);
        if delta == 0 {
            return self.total;
        }
        self.apply(delta)
    }

    /// Drops everything staged without applying it.
    pub fn discard(&mut self) -> i64 {
        std::mem::take(&mut self.pending)
    }

    /// Applies or stages `delta` according to the commit style.
    pub fn record(&mut self, delta: i64) {
        match self.policy.commit {
            CommitStyle::Live => {
                self.apply(delta);
            }
            CommitStyle::Batch => self.stage(delta),
        }
    }

    /// Current committed total. Never mutates.
    pub fn snapshot(&self) -> i64 {
        self.total
    }

    pub fn pending(&self) -> i64 {
        self.pending
    }

    pub fn is_clamping(&self) -> bool {
        self.policy.floor.is_some()
    }

    pub fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Number of deltas applied to the total so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}
