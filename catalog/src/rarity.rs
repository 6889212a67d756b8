//! Rarity tiers controlling kill quotas and experience multipliers.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};
use world_level_core::{EntityId, RarityTier};

/// One value per rarity tier. Tiers missing from a configuration keep their
/// default value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de>, TierTable<T>: Default"))]
pub struct TierTable<T> {
    /// Value for common enemies.
    pub normal: T,
    /// Value for hostile enemies.
    pub hostile: T,
    /// Value for special enemies.
    pub special: T,
    /// Value for super rare enemies.
    pub super_rare: T,
}

impl<T: Copy> TierTable<T> {
    /// Reads the value assigned to `tier`.
    #[must_use]
    pub fn get(&self, tier: RarityTier) -> T {
        match tier {
            RarityTier::Normal => self.normal,
            RarityTier::Hostile => self.hostile,
            RarityTier::Special => self.special,
            RarityTier::SuperRare => self.super_rare,
        }
    }
}

impl Default for TierTable<KillRange> {
    fn default() -> Self {
        Self {
            normal: KillRange::new(20, 40),
            hostile: KillRange::new(10, 20),
            special: KillRange::new(5, 10),
            super_rare: KillRange::new(1, 1),
        }
    }
}

impl Default for TierTable<f64> {
    fn default() -> Self {
        Self {
            normal: 1.0,
            hostile: 1.5,
            special: 2.5,
            super_rare: 5.0,
        }
    }
}

/// Inclusive range of kills a task may require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRange {
    /// Lower bound.
    pub min: u32,
    /// Upper bound.
    pub max: u32,
}

impl KillRange {
    /// Creates a range, swapping inverted bounds.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Draws a uniform kill count from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let range = Self::new(self.min, self.max);
        rng.gen_range(range.min..=range.max)
    }
}

/// Experience multiplier pinned to a single entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct XpOverride {
    /// Entity the override applies to.
    pub entity: EntityId,
    /// Multiplier replacing the tier default.
    pub multiplier: f64,
}

/// Serializable rarity table loaded from the engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityConfig {
    /// Entities classified as special.
    pub special_entities: BTreeSet<EntityId>,
    /// Entities classified as hostile.
    pub hostile_entities: BTreeSet<EntityId>,
    /// Entities classified as super rare.
    pub super_rare_entities: BTreeSet<EntityId>,
    /// Kill range per tier.
    pub kill_ranges: TierTable<KillRange>,
    /// Experience multiplier per tier.
    pub xp_multipliers: TierTable<f64>,
    /// Per-entity multipliers that take precedence over the tier default.
    pub overrides: Vec<XpOverride>,
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self {
            special_entities: ids(&[85, 629, 473, 474, 475]),
            hostile_entities: ids(&[62, 66, 24, 32, 34, 71]),
            super_rare_entities: ids(&[-4, 196, 45, 172]),
            kill_ranges: TierTable::default(),
            xp_multipliers: TierTable::default(),
            overrides: Vec::new(),
        }
    }
}

fn ids(raw: &[i32]) -> BTreeSet<EntityId> {
    raw.iter().copied().map(EntityId::new).collect()
}

/// Pure mapping from entities to rarity tiers, kill quotas, and multipliers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RarityPolicy {
    config: RarityConfig,
}

impl RarityPolicy {
    /// Wraps a loaded rarity table.
    #[must_use]
    pub fn new(config: RarityConfig) -> Self {
        Self { config }
    }

    /// Underlying table.
    #[must_use]
    pub fn config(&self) -> &RarityConfig {
        &self.config
    }

    /// Classifies an entity. Special membership is checked first, then hostile,
    /// then super rare; anything else is normal.
    #[must_use]
    pub fn tier(&self, entity: EntityId) -> RarityTier {
        if self.config.special_entities.contains(&entity) {
            RarityTier::Special
        } else if self.config.hostile_entities.contains(&entity) {
            RarityTier::Hostile
        } else if self.config.super_rare_entities.contains(&entity) {
            RarityTier::SuperRare
        } else {
            RarityTier::Normal
        }
    }

    /// Kill range configured for a tier.
    #[must_use]
    pub fn kill_range(&self, tier: RarityTier) -> KillRange {
        self.config.kill_ranges.get(tier)
    }

    /// Samples the unscaled kill quota for an entity.
    pub fn required_kills<R: Rng + ?Sized>(&self, entity: EntityId, rng: &mut R) -> u32 {
        self.kill_range(self.tier(entity)).sample(rng)
    }

    /// Experience multiplier for an entity, honouring per-entity overrides.
    #[must_use]
    pub fn xp_multiplier(&self, entity: EntityId) -> f64 {
        self.config
            .overrides
            .iter()
            .find(|entry| entry.entity == entity)
            .map_or_else(
                || self.config.xp_multipliers.get(self.tier(entity)),
                |entry| entry.multiplier,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn special_membership_wins_over_hostile() {
        let mut config = RarityConfig::default();
        let _ = config.hostile_entities.insert(EntityId::new(85));
        let policy = RarityPolicy::new(config);
        assert_eq!(policy.tier(EntityId::new(85)), RarityTier::Special);
        assert_eq!(policy.tier(EntityId::new(62)), RarityTier::Hostile);
        assert_eq!(policy.tier(EntityId::new(196)), RarityTier::SuperRare);
        assert_eq!(policy.tier(EntityId::new(1)), RarityTier::Normal);
    }

    #[test]
    fn sampled_kills_stay_inside_the_tier_range() {
        let policy = RarityPolicy::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let kills = policy.required_kills(EntityId::new(1), &mut rng);
            assert!((20..=40).contains(&kills), "normal quota {kills}");
            let kills = policy.required_kills(EntityId::new(62), &mut rng);
            assert!((10..=20).contains(&kills), "hostile quota {kills}");
            assert_eq!(policy.required_kills(EntityId::new(45), &mut rng), 1);
        }
    }

    #[test]
    fn inverted_ranges_are_normalised() {
        let range = KillRange::new(9, 3);
        assert_eq!(range, KillRange { min: 3, max: 9 });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let raw = KillRange { min: 9, max: 3 };
        assert!((3..=9).contains(&raw.sample(&mut rng)));
    }

    #[test]
    fn overrides_replace_tier_multiplier() {
        let mut config = RarityConfig::default();
        config.overrides.push(XpOverride {
            entity: EntityId::new(62),
            multiplier: 4.0,
        });
        let policy = RarityPolicy::new(config);
        assert_eq!(policy.xp_multiplier(EntityId::new(62)), 4.0);
        assert_eq!(policy.xp_multiplier(EntityId::new(24)), 1.5);
        assert_eq!(policy.xp_multiplier(EntityId::new(1)), 1.0);
    }

    #[test]
    fn partial_toml_keeps_unspecified_defaults() {
        let config: RarityConfig = toml::from_str(
            r#"
special_entities = [1]

[[overrides]]
entity = 2
multiplier = 3.0
"#,
        )
        .expect("parse rarity table");
        let policy = RarityPolicy::new(config);
        assert_eq!(policy.tier(EntityId::new(1)), RarityTier::Special);
        assert_eq!(policy.tier(EntityId::new(85)), RarityTier::Normal);
        assert_eq!(policy.kill_range(RarityTier::Normal), KillRange::new(20, 40));
        assert_eq!(policy.xp_multiplier(EntityId::new(2)), 3.0);
    }

    #[test]
    fn partial_tier_tables_fill_missing_tiers() {
        let config: RarityConfig = toml::from_str(
            r#"
[kill_ranges]
normal = { min = 30, max = 50 }

[xp_multipliers]
super_rare = 8.0
"#,
        )
        .expect("parse rarity table");
        let policy = RarityPolicy::new(config);
        assert_eq!(policy.kill_range(RarityTier::Normal), KillRange::new(30, 50));
        assert_eq!(policy.kill_range(RarityTier::Hostile), KillRange::new(10, 20));
        assert_eq!(policy.kill_range(RarityTier::SuperRare), KillRange::new(1, 1));
        assert_eq!(policy.xp_multiplier(EntityId::new(196)), 8.0);
        assert_eq!(policy.xp_multiplier(EntityId::new(62)), 1.5);
    }
}
