#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! World level ledger and the experience curve that drives it.
//!
//! The ledger is a two-state machine: it idles while the accumulated
//! experience is below the requirement and runs the level-up loop whenever
//! experience is added or the requirement is recomputed. A single large grant
//! may cross several levels; every crossing is applied in the same call and
//! the requirement is recomputed immediately after each increment.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Level every fresh or restored ledger starts from at minimum.
pub const MINIMUM_LEVEL: u32 = 1;

/// Geometric experience curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XpCurve {
    /// Requirement at level zero and the base of the curve.
    pub base_xp: u64,
    /// Growth factor applied per level.
    pub level_multiplier: f64,
}

impl XpCurve {
    /// Creates a curve from its base and growth factor.
    #[must_use]
    pub const fn new(base_xp: u64, level_multiplier: f64) -> Self {
        Self {
            base_xp,
            level_multiplier,
        }
    }

    /// Whether the curve grows: a base of at least one and a finite
    /// multiplier above one.
    #[must_use]
    pub fn is_increasing(&self) -> bool {
        self.base_xp >= 1 && self.level_multiplier.is_finite() && self.level_multiplier > 1.0
    }

    /// Experience required to advance past `level`.
    ///
    /// Level zero uses the base directly. The result saturates at
    /// `u64::MAX` and is never zero.
    #[must_use]
    pub fn required_for(&self, level: u32) -> u64 {
        if level == 0 {
            return self.base_xp.max(1);
        }

        let exponent = i32::try_from(level).unwrap_or(i32::MAX);
        let scaled = self.base_xp as f64 * self.level_multiplier.powi(exponent);
        if scaled.is_nan() {
            return self.base_xp.max(1);
        }
        (scaled as u64).max(1)
    }
}

impl Default for XpCurve {
    fn default() -> Self {
        Self::new(10_240, 3.8)
    }
}

/// Level transition produced by the level-up loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    /// Level reached.
    pub level: u32,
    /// Requirement for the following level.
    pub required: u64,
}

/// Authoritative world level, experience, and requirement.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressionLedger {
    curve: XpCurve,
    level: u32,
    current_xp: u64,
    required_xp: u64,
}

impl ProgressionLedger {
    /// Creates a ledger at the minimum level with no experience.
    #[must_use]
    pub fn new(curve: XpCurve) -> Self {
        Self {
            curve,
            level: MINIMUM_LEVEL,
            current_xp: 0,
            required_xp: curve.required_for(MINIMUM_LEVEL),
        }
    }

    /// Rebuilds a ledger from persisted values.
    ///
    /// The level is floored at [`MINIMUM_LEVEL`] and a zero requirement is
    /// recomputed from the curve. Stored experience that already covers the
    /// requirement is settled into level-ups.
    #[must_use]
    pub fn restore(curve: XpCurve, level: u32, current_xp: u64, required_xp: u64) -> Self {
        let level = level.max(MINIMUM_LEVEL);
        let required_xp = if required_xp == 0 {
            curve.required_for(level)
        } else {
            required_xp
        };
        let mut ledger = Self {
            curve,
            level,
            current_xp,
            required_xp,
        };
        let mut level_ups = Vec::new();
        ledger.settle(&mut level_ups);
        if !level_ups.is_empty() {
            debug!(
                from = level,
                to = ledger.level,
                "stored experience settled on restore"
            );
        }
        ledger
    }

    /// Curve used to recompute requirements.
    #[must_use]
    pub const fn curve(&self) -> XpCurve {
        self.curve
    }

    /// Current world level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn current_xp(&self) -> u64 {
        self.current_xp
    }

    /// Experience required to reach the next level.
    #[must_use]
    pub const fn required_xp(&self) -> u64 {
        self.required_xp
    }

    /// Experience still missing before the next level.
    #[must_use]
    pub const fn remaining_xp(&self) -> u64 {
        self.required_xp.saturating_sub(self.current_xp)
    }

    /// Progress toward the next level as a whole percentage.
    #[must_use]
    pub fn percent_to_next(&self) -> u64 {
        if self.required_xp == 0 {
            return 0;
        }
        let percent = u128::from(self.current_xp) * 100 / u128::from(self.required_xp);
        u64::try_from(percent).unwrap_or(u64::MAX)
    }

    /// Adds experience and applies every level-up it pays for.
    pub fn grant(&mut self, amount: u64, out: &mut Vec<LevelUp>) {
        self.current_xp = self.current_xp.saturating_add(amount);
        self.settle(out);
    }

    /// Replaces the world level without touching experience or requirement.
    ///
    /// Returns the level that was replaced.
    pub fn set_level(&mut self, level: u32) -> u32 {
        std::mem::replace(&mut self.level, level)
    }

    /// Recomputes the requirement for the current level and settles.
    pub fn recalculate(&mut self, out: &mut Vec<LevelUp>) {
        self.required_xp = self.curve.required_for(self.level);
        self.settle(out);
    }

    fn settle(&mut self, out: &mut Vec<LevelUp>) {
        while self.current_xp >= self.required_xp {
            self.current_xp -= self.required_xp;
            self.level = self.level.saturating_add(1);
            self.required_xp = self.curve.required_for(self.level);
            debug!(
                level = self.level,
                required = self.required_xp,
                "world level advanced"
            );
            out.push(LevelUp {
                level: self.level,
                required: self.required_xp,
            });
        }
    }
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self::new(XpCurve::default())
    }
}
