//! Collector: items keep appearing on the field for a few seconds each.
//! Catching a good one scores, catching a hazard costs. Plays against the
//! clock, so configure it with `duration_seconds`.

use std::time::Duration;

use minigame_content::{ContentError, RandomSource, StreamItem, StreamPools, stream_item};
use minigame_engine::{GameAdapter, ScorePolicy, SessionMode};
use serde::{Deserialize, Serialize};
use tracing::trace;

pub struct Collector;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorExtras {
    /// Good item variants.
    pub desirable: usize,
    /// Hazard variants.
    pub undesirable: usize,
    /// Chance a spawn is a good item.
    pub p_desirable: f64,
    /// Spawn gap bounds. `spawn_max_ms == 0` disables spawning.
    pub spawn_min_ms: u64,
    pub spawn_max_ms: u64,
    /// Countdown ticks an item stays on the field.
    pub ttl_seconds: u32,
    /// Items allowed on the field at once. Spawns beyond this are skipped.
    pub max_items: usize,
    pub catch_points: i64,
    pub hazard_penalty: i64,
}

impl Default for CollectorExtras {
    fn default() -> Self {
        Self {
            desirable: 6,
            undesirable: 3,
            p_desirable: 0.75,
            spawn_min_ms: 600,
            spawn_max_ms: 1_200,
            ttl_seconds: 3,
            max_items: 6,
            catch_points: 10,
            hazard_penalty: 15,
        }
    }
}

impl CollectorExtras {
    fn pools(&self) -> StreamPools {
        StreamPools {
            desirable: self.desirable,
            undesirable: self.undesirable,
            p_desirable: self.p_desirable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldItem {
    pub id: u64,
    pub item: StreamItem,
    /// Ticks left before it disappears.
    pub ttl: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Field {
    pub items: Vec<FieldItem>,
    pub next_id: u64,
    pub caught: u32,
    /// Good items that expired uncaught.
    pub missed: u32,
}

/// Catch the item with this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catch(pub u64);

impl GameAdapter for Collector {
    type Extras = CollectorExtras;
    type Content = Field;
    type Input = Catch;
    const NAME: &'static str = "collector";

    /// Items only spawn against the countdown, so a round-bounded session
    /// would never end.
    fn check_config(extras: &CollectorExtras, mode: SessionMode) -> Result<(), String> {
        if let SessionMode::Rounds(_) = mode {
            return Err("collector plays against the clock, set duration_seconds".into());
        }
        if !(0.0..=1.0).contains(&extras.p_desirable) {
            return Err(ContentError::Probability(extras.p_desirable.to_string()).to_string());
        }
        Ok(())
    }

    /// The field starts empty; the spawner fills it.
    fn generate_content(
        extras: &CollectorExtras,
        _round: u32,
        _rng: &mut dyn RandomSource,
    ) -> Result<Field, ContentError> {
        if !(0.0..=1.0).contains(&extras.p_desirable) {
            return Err(ContentError::Probability(extras.p_desirable.to_string()));
        }
        Ok(Field::default())
    }

    fn scoring(_extras: &CollectorExtras) -> ScorePolicy {
        ScorePolicy::live()
    }

    fn validate_input(
        _extras: &CollectorExtras,
        field: &Field,
        _collected: &[Catch],
        catch: &Catch,
    ) -> Result<(), String> {
        if field.items.iter().any(|i| i.id == catch.0) {
            Ok(())
        } else {
            Err(format!("no item {} on the field", catch.0))
        }
    }

    fn apply_input(extras: &CollectorExtras, field: &mut Field, _collected: &[Catch], catch: &Catch) -> i64 {
        let Some(pos) = field.items.iter().position(|i| i.id == catch.0) else {
            return 0;
        };
        let caught = field.items.remove(pos);
        if caught.item.desirable {
            field.caught += 1;
            extras.catch_points
        } else {
            -extras.hazard_penalty
        }
    }

    fn on_tick(_extras: &CollectorExtras, field: &mut Field, time_left: u32) {
        let before = field.items.len();
        let mut missed = 0;
        field.items.retain_mut(|i| {
            i.ttl = i.ttl.saturating_sub(1);
            if i.ttl == 0 && i.item.desirable {
                missed += 1;
            }
            i.ttl > 0
        });
        field.missed += missed;
        trace!(time_left, expired = before - field.items.len(), "field aged");
    }

    fn spawn_delay(extras: &CollectorExtras, rng: &mut dyn RandomSource) -> Option<Duration> {
        if extras.spawn_max_ms == 0 {
            return None;
        }
        let lo = extras.spawn_min_ms.min(extras.spawn_max_ms) as i64;
        let hi = extras.spawn_min_ms.max(extras.spawn_max_ms) as i64;
        Some(Duration::from_millis(rng.between(lo, hi) as u64))
    }

    fn spawn(extras: &CollectorExtras, field: &mut Field, rng: &mut dyn RandomSource) -> Result<(), ContentError> {
        if field.items.len() >= extras.max_items {
            trace!(items = field.items.len(), "field full, spawn skipped");
            return Ok(());
        }
        let item = stream_item(rng, extras.pools())?;
        field.items.push(FieldItem {
            id: field.next_id,
            item,
            ttl: extras.ttl_seconds,
        });
        field.next_id += 1;
        Ok(())
    }
}
