//! Session configuration and the lifecycle state machine.

use std::fmt;
use std::num::NonZeroU32;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EngineError;

// ---------------------------------------------------------------------------
// RawSessionConfig
// ---------------------------------------------------------------------------

/// The loosely-typed configuration a host hands to `start`.
///
/// Accepts both `snake_case` and `camelCase` keys so a kiosk can forward
/// its JSON untouched. Nothing here is trusted until
/// [`validate`](Self::validate) turns it into a [`SessionConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSessionConfig {
    #[serde(default, alias = "roundCount")]
    pub round_count: Option<u32>,

    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<u32>,

    /// Game-specific tunables, decoded into the game's extras type.
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl RawSessionConfig {
    /// A round-bounded config.
    pub fn rounds(count: u32) -> Self {
        Self {
            round_count: Some(count),
            ..Self::default()
        }
    }

    /// A duration-bounded config.
    pub fn duration(seconds: u32) -> Self {
        Self {
            duration_seconds: Some(seconds),
            ..Self::default()
        }
    }

    /// Adds one extras entry.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Checks the mode invariant and decodes the extras.
    ///
    /// Exactly one of `round_count`/`duration_seconds` must be set, and it
    /// must be at least 1. Missing extras keys fall back to `E::default()`
    /// values; unknown keys are rejected if `E` denies them.
    pub fn validate<E: DeserializeOwned>(
        self,
        game: &'static str,
    ) -> Result<SessionConfig<E>, EngineError> {
        let mode = SessionMode::from_parts(self.round_count, self.duration_seconds)?;
        let extras = serde_json::from_value(Value::Object(self.extra))
            .map_err(|source| EngineError::Extras { game, source })?;
        Ok(SessionConfig { mode, extras })
    }
}

// ---------------------------------------------------------------------------
// SessionMode / SessionConfig
// ---------------------------------------------------------------------------

/// How a session is bounded. Never both, never neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    /// A fixed number of rounds.
    Rounds(NonZeroU32),
    /// A countdown in whole seconds.
    Duration(NonZeroU32),
}

impl SessionMode {
    /// Builds the mode from the two optional raw fields.
    pub fn from_parts(
        round_count: Option<u32>,
        duration_seconds: Option<u32>,
    ) -> Result<Self, EngineError> {
        match (round_count, duration_seconds) {
            (Some(_), Some(_)) => Err(EngineError::InvalidConfig(
                "round_count and duration_seconds are mutually exclusive".into(),
            )),
            (None, None) => Err(EngineError::InvalidConfig(
                "one of round_count or duration_seconds is required".into(),
            )),
            (Some(n), None) => NonZeroU32::new(n)
                .map(Self::Rounds)
                .ok_or_else(|| EngineError::InvalidConfig("round_count must be at least 1".into())),
            (None, Some(s)) => NonZeroU32::new(s).map(Self::Duration).ok_or_else(|| {
                EngineError::InvalidConfig("duration_seconds must be at least 1".into())
            }),
        }
    }

    pub fn round_count(&self) -> Option<u32> {
        match self {
            Self::Rounds(n) => Some(n.get()),
            Self::Duration(_) => None,
        }
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        match self {
            Self::Rounds(_) => None,
            Self::Duration(s) => Some(s.get()),
        }
    }
}

/// A validated configuration: the mode plus the game's typed extras.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig<E> {
    pub mode: SessionMode,
    pub extras: E,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle of a session.
///
/// Transitions are strictly ordered:
///
/// ```text
/// Idle → Active → Terminal
/// ```
///
/// - **Idle**: constructed, not started. Input is ignored.
/// - **Active**: rounds or the countdown are running.
/// - **Terminal**: the result has been produced. Nothing changes anymore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Idle,
    Active,
    Terminal,
}

impl Lifecycle {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// The only valid successor, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Active),
            Self::Active => Some(Self::Terminal),
            Self::Terminal => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
            Self::Terminal => write!(f, "Terminal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct Extras {
        pattern_length: usize,
        points: i64,
    }

    #[test]
    fn test_rounds_mode() {
        let cfg = RawSessionConfig::rounds(3).validate::<Extras>("test").unwrap();
        assert_eq!(cfg.mode.round_count(), Some(3));
        assert_eq!(cfg.mode.duration_seconds(), None);
    }

    #[test]
    fn test_duration_mode() {
        let cfg = RawSessionConfig::duration(30).validate::<Extras>("test").unwrap();
        assert_eq!(cfg.mode.duration_seconds(), Some(30));
    }

    #[test]
    fn test_both_modes_rejected() {
        let raw = RawSessionConfig {
            round_count: Some(3),
            duration_seconds: Some(10),
            ..RawSessionConfig::default()
        };
        let err = raw.validate::<Extras>("test").unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_neither_mode_rejected() {
        let err = RawSessionConfig::default().validate::<Extras>("test").unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_rejected() {
        assert!(RawSessionConfig::rounds(0).validate::<Extras>("test").is_err());
        assert!(RawSessionConfig::duration(0).validate::<Extras>("test").is_err());
    }

    #[test]
    fn test_extras_decoded_with_defaults() {
        let cfg = RawSessionConfig::rounds(1)
            .with_extra("points", 25)
            .validate::<Extras>("test")
            .unwrap();
        assert_eq!(
            cfg.extras,
            Extras {
                pattern_length: 0,
                points: 25
            }
        );
    }

    #[test]
    fn test_unknown_extra_rejected() {
        let err = RawSessionConfig::rounds(1)
            .with_extra("bogus", true)
            .validate::<Extras>("test")
            .unwrap_err();
        assert!(matches!(err, EngineError::Extras { game: "test", .. }));
    }

    #[test]
    fn test_camel_case_json() {
        let raw: RawSessionConfig =
            serde_json::from_str(r#"{"roundCount": 5, "extra": {"points": 10}}"#).unwrap();
        assert_eq!(raw.round_count, Some(5));
        assert_eq!(raw.duration_seconds, None);
        assert_eq!(raw.extra["points"], 10);
    }

    #[test]
    fn test_lifecycle_order() {
        assert_eq!(Lifecycle::Idle.next(), Some(Lifecycle::Active));
        assert_eq!(Lifecycle::Active.next(), Some(Lifecycle::Terminal));
        assert_eq!(Lifecycle::Terminal.next(), None);
        assert!(!Lifecycle::Idle.can_transition_to(Lifecycle::Terminal));
        assert!(Lifecycle::Active.is_active());
        assert!(Lifecycle::Terminal.is_terminal());
        assert_eq!(Lifecycle::Active.to_string(), "Active");
    }
}
