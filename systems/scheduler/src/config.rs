//! Engine configuration groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use world_level_catalog::RarityConfig;
use world_level_system_progression::XpCurve;
use world_level_system_reroll::{next_utc_midnight, RerollPolicy};
use world_level_system_task_generation::TaskTuning;
use world_level_world::{World, WorldSnapshot};

/// Currency paid out when a task completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    /// Pool size at level zero.
    pub base_payout: u64,
    /// Pool growth per world level.
    pub payout_per_level: u64,
    /// Name of the currency used in player messages.
    pub currency: String,
}

impl RewardPolicy {
    /// Total pool shared by contributors at `level`.
    #[must_use]
    pub fn pool_for(&self, level: u32) -> u64 {
        self.base_payout
            .saturating_add(u64::from(level).saturating_mul(self.payout_per_level))
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            base_payout: 100_000,
            payout_per_level: 500,
            currency: "points".to_owned(),
        }
    }
}

/// Rate limits for public announcements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastPolicy {
    /// Minimum milliseconds between two progress broadcasts.
    pub progress_interval_ms: u64,
}

impl Default for BroadcastPolicy {
    fn default() -> Self {
        Self {
            progress_interval_ms: 2_000,
        }
    }
}

/// Every tunable of the engine, loaded once at startup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Experience curve.
    pub progression: XpCurve,
    /// Goal and reward constants.
    pub tasks: TaskTuning,
    /// Completion payouts.
    pub rewards: RewardPolicy,
    /// Reroll cost and limits.
    pub rerolls: RerollPolicy,
    /// Announcement rate limits.
    pub broadcast: BroadcastPolicy,
    /// Rarity tiers.
    pub rarity: RarityConfig,
    /// Seed for deterministic sessions; entropy is used when absent.
    pub rng_seed: Option<u64>,
}

/// Reasons a loaded configuration is refused.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The experience curve does not grow with the level.
    #[error(
        "experience curve must grow: base_xp {base_xp} must be at least 1 and \
         level_multiplier {level_multiplier} must be finite and above 1"
    )]
    FlatCurve {
        /// Configured base.
        base_xp: u64,
        /// Configured growth factor.
        level_multiplier: f64,
    },
}

impl EngineConfig {
    /// Checks the tunables that the level-up loop depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.progression.is_increasing() {
            return Err(ConfigError::FlatCurve {
                base_xp: self.progression.base_xp,
                level_multiplier: self.progression.level_multiplier,
            });
        }
        Ok(())
    }

    /// Fresh world for a new session starting at `now`.
    #[must_use]
    pub fn fresh_world(&self, now: DateTime<Utc>) -> World {
        World::new(
            self.progression,
            self.tasks.recent_capacity,
            next_utc_midnight(now),
        )
    }

    /// World rebuilt from a persisted snapshot.
    #[must_use]
    pub fn restore_world(&self, snapshot: WorldSnapshot, now: DateTime<Utc>) -> World {
        World::restore(
            snapshot,
            self.progression,
            self.tasks.recent_capacity,
            next_utc_midnight(now),
        )
    }
}
