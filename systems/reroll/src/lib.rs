#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooldown and daily-cap rules for the paid task reroll.
//!
//! The limiter is pure: it inspects [`RerollRecord`] values owned by the world
//! and reports decisions. Consuming a reroll and clearing the daily counters
//! are world commands issued by the scheduler once a decision is final.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use world_level_core::RerollRecord;

/// Tunable reroll rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerollPolicy {
    /// Currency debited per reroll.
    pub cost: u64,
    /// Minimum seconds between two rerolls by the same actor.
    pub cooldown_secs: u64,
    /// Rerolls allowed per actor between daily resets.
    pub daily_cap: u32,
}

impl Default for RerollPolicy {
    fn default() -> Self {
        Self {
            cost: 50_000,
            cooldown_secs: 300,
            daily_cap: 10,
        }
    }
}

/// Reason a reroll was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RerollDenial {
    /// The actor rerolled too recently.
    CoolingDown {
        /// Time left before the cooldown elapses.
        remaining: Duration,
    },
    /// The actor exhausted the daily allowance.
    DailyCapReached {
        /// Allowance that was exhausted.
        cap: u32,
        /// Time left before the next daily reset.
        resets_in: Duration,
    },
}

impl fmt::Display for RerollDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RerollDenial::CoolingDown { remaining } => {
                let minutes = (remaining.num_seconds().max(0) + 59) / 60;
                write!(
                    f,
                    "You must wait {minutes} more minutes before rerolling again."
                )
            }
            RerollDenial::DailyCapReached { cap, resets_in } => {
                let resets_in = (*resets_in).max(Duration::zero());
                write!(
                    f,
                    "You've reached your daily limit of {cap} rerolls! Resets in: {}h {}m",
                    resets_in.num_hours(),
                    resets_in.num_minutes() % 60
                )
            }
        }
    }
}

/// Applies the cooldown and daily cap to individual reroll records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RerollLimiter {
    cooldown: Duration,
    daily_cap: u32,
}

impl RerollLimiter {
    /// Creates a limiter with an explicit cooldown and daily cap.
    #[must_use]
    pub const fn new(cooldown: Duration, daily_cap: u32) -> Self {
        Self {
            cooldown,
            daily_cap,
        }
    }

    /// Builds a limiter from the configured policy.
    #[must_use]
    pub fn from_policy(policy: &RerollPolicy) -> Self {
        let seconds = policy.cooldown_secs.min(u64::from(u32::MAX));
        Self::new(
            Duration::seconds(i64::try_from(seconds).unwrap_or(i64::from(u32::MAX))),
            policy.daily_cap,
        )
    }

    /// Minimum time between two rerolls by the same actor.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Rerolls allowed per actor between daily resets.
    #[must_use]
    pub const fn daily_cap(&self) -> u32 {
        self.daily_cap
    }

    /// Checks both rules, cooldown first.
    pub fn check(
        &self,
        record: &RerollRecord,
        now: DateTime<Utc>,
        next_reset: DateTime<Utc>,
    ) -> Result<(), RerollDenial> {
        if let Some(last) = record.last_reroll_at {
            let elapsed = now - last;
            if elapsed < self.cooldown {
                return Err(RerollDenial::CoolingDown {
                    remaining: self.cooldown - elapsed,
                });
            }
        }

        if record.used_today >= self.daily_cap {
            return Err(RerollDenial::DailyCapReached {
                cap: self.daily_cap,
                resets_in: next_reset - now,
            });
        }

        Ok(())
    }

    /// Reports whether the actor may reroll at `now`.
    #[must_use]
    pub fn can_reroll(&self, record: &RerollRecord, now: DateTime<Utc>) -> bool {
        self.check(record, now, now).is_ok()
    }

    /// Rerolls the actor still has today.
    #[must_use]
    pub fn remaining_today(&self, record: &RerollRecord) -> u32 {
        self.daily_cap.saturating_sub(record.used_today)
    }
}

impl Default for RerollLimiter {
    fn default() -> Self {
        Self::from_policy(&RerollPolicy::default())
    }
}

/// Record after a successful reroll at `now`.
#[must_use]
pub fn consumed(record: RerollRecord, now: DateTime<Utc>) -> RerollRecord {
    RerollRecord {
        last_reroll_at: Some(now),
        used_today: record.used_today.saturating_add(1),
    }
}

/// First UTC midnight strictly after `now`.
#[must_use]
pub fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(now + Duration::days(1), |midnight| {
            Utc.from_utc_datetime(&midnight)
        })
}

/// Reports whether the daily boundary has been reached.
#[must_use]
pub fn reset_due(now: DateTime<Utc>, next_reset: DateTime<Utc>) -> bool {
    now >= next_reset
}
