#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immutable catalog tables describing bosses, enemy categories, and variants.
//!
//! The catalog is pure data loaded once at startup. Task generation reads the
//! categories, the boss gate reads the unlock levels, and kill validation reads
//! the variant groups. Nothing in this crate mutates after construction.

use std::collections::{BTreeSet, HashMap};

use world_level_core::{Boss, EntityId};

mod data;
mod rarity;

pub use rarity::{KillRange, RarityConfig, RarityPolicy, TierTable, XpOverride};

/// Difficulty factor applied to categories the catalog does not know.
pub const DEFAULT_CATEGORY_DIFFICULTY: f64 = 1.0;

/// Unlock definition for a single boss encounter.
#[derive(Clone, Debug, PartialEq)]
pub struct BossDefinition {
    boss: Boss,
    required_level: u32,
    hardmode: bool,
    components: Vec<EntityId>,
    task_title: String,
    objective: String,
}

impl BossDefinition {
    /// Creates a boss definition.
    ///
    /// `components` lists every host entity that makes up the encounter in a
    /// stable order; multi-form encounters list each form so that all of them
    /// resolve to the same boss.
    #[must_use]
    pub fn new(
        boss: Boss,
        required_level: u32,
        hardmode: bool,
        components: Vec<EntityId>,
        task_title: impl Into<String>,
        objective: impl Into<String>,
    ) -> Self {
        Self {
            boss,
            required_level,
            hardmode,
            components,
            task_title: task_title.into(),
            objective: objective.into(),
        }
    }

    /// Symbolic tag identifying the boss.
    #[must_use]
    pub const fn boss(&self) -> Boss {
        self.boss
    }

    /// World level at which the boss may be summoned.
    #[must_use]
    pub const fn required_level(&self) -> u32 {
        self.required_level
    }

    /// Reports whether the boss belongs to the hardmode progression.
    #[must_use]
    pub const fn is_hardmode(&self) -> bool {
        self.hardmode
    }

    /// Host entities that form the encounter, canonical form first.
    #[must_use]
    pub fn components(&self) -> &[EntityId] {
        &self.components
    }

    /// Short title used when presenting tasks that prepare for this boss.
    #[must_use]
    pub fn task_title(&self) -> &str {
        &self.task_title
    }

    /// One-line description of the preparation objective.
    #[must_use]
    pub fn objective(&self) -> &str {
        &self.objective
    }
}

/// Named bucket of thematically related enemies used to diversify tasks.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyCategory {
    name: String,
    hardmode: bool,
    members: Vec<EntityId>,
    feeds: Vec<Boss>,
    difficulty: f64,
}

impl EnemyCategory {
    /// Creates a category. Duplicate members and bosses are dropped while the
    /// first occurrence order is preserved.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        hardmode: bool,
        members: impl IntoIterator<Item = i32>,
        feeds: impl IntoIterator<Item = Boss>,
        difficulty: f64,
    ) -> Self {
        Self {
            name: name.into(),
            hardmode,
            members: dedup_in_order(members.into_iter().map(EntityId::new)),
            feeds: dedup_in_order(feeds),
            difficulty,
        }
    }

    /// Display name of the category.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reports whether the category only appears once hardmode is active.
    #[must_use]
    pub const fn is_hardmode(&self) -> bool {
        self.hardmode
    }

    /// Entities that may be drawn as task targets, in catalog order.
    #[must_use]
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Bosses this category prepares the world for.
    #[must_use]
    pub fn feeds(&self) -> &[Boss] {
        &self.feeds
    }

    /// Reward multiplier reflecting how dangerous the category is.
    #[must_use]
    pub const fn difficulty(&self) -> f64 {
        self.difficulty
    }
}

/// Entities that are interchangeable when matching kills against a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantGroup {
    name: String,
    members: BTreeSet<EntityId>,
}

impl VariantGroup {
    /// Creates a variant group.
    #[must_use]
    pub fn new(name: impl Into<String>, members: impl IntoIterator<Item = i32>) -> Self {
        Self {
            name: name.into(),
            members: members.into_iter().map(EntityId::new).collect(),
        }
    }

    /// Display name of the group.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entities in the group.
    #[must_use]
    pub fn members(&self) -> &BTreeSet<EntityId> {
        &self.members
    }
}

/// Immutable lookup tables consulted by every system.
#[derive(Clone, Debug)]
pub struct Catalog {
    bosses: Vec<BossDefinition>,
    categories: Vec<EnemyCategory>,
    variants: Vec<VariantGroup>,
    variant_index: HashMap<EntityId, usize>,
    component_index: HashMap<EntityId, Boss>,
}

impl Catalog {
    /// Builds a catalog from raw tables and indexes entity lookups.
    ///
    /// When an entity appears in several variant groups or boss definitions the
    /// first listing wins.
    #[must_use]
    pub fn new(
        bosses: Vec<BossDefinition>,
        categories: Vec<EnemyCategory>,
        variants: Vec<VariantGroup>,
    ) -> Self {
        let mut variant_index = HashMap::new();
        for (index, group) in variants.iter().enumerate() {
            for member in group.members() {
                let _ = variant_index.entry(*member).or_insert(index);
            }
        }

        let mut component_index = HashMap::new();
        for definition in &bosses {
            for component in definition.components() {
                let _ = component_index
                    .entry(*component)
                    .or_insert(definition.boss());
            }
        }

        Self {
            bosses,
            categories,
            variants,
            variant_index,
            component_index,
        }
    }

    /// Catalog shipped with the engine.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            data::bosses(),
            data::categories(),
            data::variant_groups(),
        )
    }

    /// Every boss definition in progression order.
    #[must_use]
    pub fn bosses(&self) -> &[BossDefinition] {
        &self.bosses
    }

    /// Looks up the definition of a boss.
    #[must_use]
    pub fn boss(&self, boss: Boss) -> Option<&BossDefinition> {
        self.bosses.iter().find(|definition| definition.boss() == boss)
    }

    /// Level required to summon the boss, or `None` for bosses the catalog does not gate.
    #[must_use]
    pub fn required_level(&self, boss: Boss) -> Option<u32> {
        self.boss(boss).map(BossDefinition::required_level)
    }

    /// Categories available for task generation.
    ///
    /// Pre-hardmode categories are always yielded; hardmode categories join
    /// them when `hardmode_active` is set.
    pub fn categories(&self, hardmode_active: bool) -> impl Iterator<Item = &EnemyCategory> {
        self.categories
            .iter()
            .filter(move |category| hardmode_active || !category.is_hardmode())
    }

    /// Looks up a category by name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&EnemyCategory> {
        self.categories
            .iter()
            .find(|category| category.name() == name)
    }

    /// Reward multiplier of a category, falling back to
    /// [`DEFAULT_CATEGORY_DIFFICULTY`] for unknown names.
    #[must_use]
    pub fn category_difficulty(&self, name: &str) -> f64 {
        self.category(name)
            .map_or(DEFAULT_CATEGORY_DIFFICULTY, EnemyCategory::difficulty)
    }

    /// Variant group the entity belongs to, if any.
    #[must_use]
    pub fn variant_group(&self, entity: EntityId) -> Option<&VariantGroup> {
        self.variant_index
            .get(&entity)
            .and_then(|index| self.variants.get(*index))
    }

    /// Resolves any form of a boss encounter to its canonical boss tag.
    #[must_use]
    pub fn resolve_boss(&self, entity: EntityId) -> Option<Boss> {
        self.component_index.get(&entity).copied()
    }

    /// Decides whether killing `killed` counts toward a task targeting `target`.
    ///
    /// Identical ids always match. Otherwise both ids must belong to the same
    /// named variant group; an entity outside every group only matches itself.
    #[must_use]
    pub fn is_valid_kill(&self, target: EntityId, killed: EntityId) -> bool {
        if target == killed {
            return true;
        }

        match (self.variant_group(target), self.variant_group(killed)) {
            (Some(target_group), Some(killed_group)) => target_group.name() == killed_group.name(),
            _ => false,
        }
    }
}

fn dedup_in_order<T>(items: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Copy + Ord,
{
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(*item))
        .collect()
}
