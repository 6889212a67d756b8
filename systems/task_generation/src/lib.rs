#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Selects the next kill objective from the catalog.
//!
//! Generation looks at the lowest boss level not yet reached, keeps every
//! category that prepares for one of those bosses or for a boss that is
//! already unlocked, and avoids entities remembered from recent tasks. Any
//! failure along the way degrades to a deterministic tutorial task so the
//! world is never left without an objective.

use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use world_level_catalog::{Catalog, EnemyCategory, RarityPolicy};
use world_level_core::{Boss, EntityId, RarityTier, Task};

/// Category used when the catalog cannot supply a tutorial category.
pub const TUTORIAL_CATEGORY: &str = "Forest/Surface";

/// Entity targeted when the catalog cannot supply a tutorial category.
pub const TUTORIAL_ENTITY: EntityId = EntityId::new(1);

/// Goal and reward constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskTuning {
    /// Extra kills required per world level for non super rare targets.
    pub goal_level_scaling: u32,
    /// Experience granted per required kill before difficulty factors.
    pub reward_multiplier: f64,
    /// Number of recent targets remembered to avoid repetition.
    pub recent_capacity: usize,
}

impl Default for TaskTuning {
    fn default() -> Self {
        Self {
            goal_level_scaling: 2,
            reward_multiplier: 2.0,
            recent_capacity: world_level_core::RECENT_TASK_CAPACITY,
        }
    }
}

/// World facts consulted when generating a task.
#[derive(Clone, Copy, Debug)]
pub struct GenerationRequest<'a> {
    /// Current world level.
    pub level: u32,
    /// Whether the host reports hardmode.
    pub hardmode_active: bool,
    /// Recently targeted entities, oldest first.
    pub recent: &'a [EntityId],
}

/// Outcome of a generation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Generated {
    /// Task to install.
    pub task: Task,
    /// Set when every candidate was recent and the memory must be cleared.
    pub memory_cleared: bool,
    /// Set when the tutorial task replaced a failed selection.
    pub fallback: bool,
}

/// Reasons a regular selection could not produce a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Every cataloged boss is already unlocked.
    #[error("every boss is unlocked at level {level}")]
    AllBossesUnlocked {
        /// Level at which generation ran.
        level: u32,
    },
    /// No category prepares for a reachable boss.
    #[error("no category is eligible at level {level}")]
    NoEligibleCategories {
        /// Level at which generation ran.
        level: u32,
    },
    /// The chosen category has no members.
    #[error("category {category} has no members")]
    EmptyCategory {
        /// Name of the empty category.
        category: String,
    },
}

/// Pure task generator parameterised by the tuning constants.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TaskGenerator {
    tuning: TaskTuning,
}

impl TaskGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new(tuning: TaskTuning) -> Self {
        Self { tuning }
    }

    /// Tuning constants in use.
    #[must_use]
    pub const fn tuning(&self) -> TaskTuning {
        self.tuning
    }

    /// Produces the next task, falling back to the tutorial task on failure.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rarity: &RarityPolicy,
        request: GenerationRequest<'_>,
        rng: &mut R,
    ) -> Generated {
        match self.try_generate(catalog, rarity, request, rng) {
            Ok(generated) => generated,
            Err(error) => {
                warn!(%error, level = request.level, "task generation fell back to tutorial task");
                Generated {
                    task: self.tutorial_task(catalog, rarity, request.level),
                    memory_cleared: false,
                    fallback: true,
                }
            }
        }
    }

    /// Runs the regular selection without the tutorial fallback.
    pub fn try_generate<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rarity: &RarityPolicy,
        request: GenerationRequest<'_>,
        rng: &mut R,
    ) -> Result<Generated, GenerationError> {
        let level = request.level;
        let next_level = catalog
            .bosses()
            .iter()
            .map(|definition| definition.required_level())
            .filter(|required| *required > level)
            .min()
            .ok_or(GenerationError::AllBossesUnlocked { level })?;
        let next_bosses: Vec<Boss> = catalog
            .bosses()
            .iter()
            .filter(|definition| definition.required_level() == next_level)
            .map(|definition| definition.boss())
            .collect();

        let eligible: Vec<&EnemyCategory> = catalog
            .categories(request.hardmode_active)
            .filter(|category| !category.members().is_empty())
            .filter(|category| {
                category.feeds().iter().any(|boss| {
                    catalog
                        .required_level(*boss)
                        .is_some_and(|required| required == next_level || required <= level)
                })
            })
            .collect();
        if eligible.is_empty() {
            return Err(GenerationError::NoEligibleCategories { level });
        }

        let fresh: Vec<&EnemyCategory> = eligible
            .iter()
            .copied()
            .filter(|category| {
                category
                    .members()
                    .iter()
                    .any(|member| !request.recent.contains(member))
            })
            .collect();
        let memory_cleared = fresh.is_empty();
        let (pool, recent) = if memory_cleared {
            debug!(level, "every candidate is recent, clearing memory");
            (eligible, &[][..])
        } else {
            (fresh, request.recent)
        };

        let Some(category) = pool.choose(rng).copied() else {
            return Err(GenerationError::NoEligibleCategories { level });
        };
        let target = pick_member(category, recent, rng)?;

        let mut bosses: Vec<Boss> = category
            .feeds()
            .iter()
            .copied()
            .filter(|boss| next_bosses.contains(boss))
            .collect();
        if bosses.is_empty() {
            bosses.extend(next_bosses.first().copied());
        }

        let goal = self.goal(rarity, target, level, rarity.required_kills(target, rng));
        let reward = self.reward(catalog, rarity, category.name(), target, goal);
        let task = Task::kill(target, bosses, category.name(), goal, reward);
        info!(
            entity = %target,
            category = category.name(),
            bosses = %task.boss_label(),
            goal = task.goal,
            reward = task.reward_xp,
            "generated task"
        );

        Ok(Generated {
            task,
            memory_cleared,
            fallback: false,
        })
    }

    /// Deterministic task used whenever regular selection fails.
    ///
    /// Picks the first pre-hardmode category that prepares for the lowest
    /// level boss and targets its first member with the lower bound of the
    /// tier's kill range.
    #[must_use]
    pub fn tutorial_task(&self, catalog: &Catalog, rarity: &RarityPolicy, level: u32) -> Task {
        let chosen = catalog
            .bosses()
            .iter()
            .min_by_key(|definition| definition.required_level())
            .and_then(|definition| {
                catalog
                    .categories(false)
                    .find(|category| category.feeds().contains(&definition.boss()))
                    .and_then(|category| {
                        category
                            .members()
                            .first()
                            .map(|member| (*member, category.name(), definition.boss()))
                    })
            });
        let (target, category, boss) =
            chosen.unwrap_or((TUTORIAL_ENTITY, TUTORIAL_CATEGORY, Boss::KingSlime));

        let base = rarity.kill_range(rarity.tier(target)).min;
        let goal = self.goal(rarity, target, level, base);
        let reward = self.reward(catalog, rarity, category, target, goal);
        Task::kill(target, vec![boss], category, goal, reward)
    }

    /// Scales a base kill count by the world level. Super rare targets keep
    /// their base count.
    #[must_use]
    pub fn goal(&self, rarity: &RarityPolicy, target: EntityId, level: u32, base: u32) -> u32 {
        let goal = if rarity.tier(target) == RarityTier::SuperRare {
            base
        } else {
            base.saturating_add(level.saturating_mul(self.tuning.goal_level_scaling))
        };
        goal.max(1)
    }

    /// Experience granted for completing `goal` kills of `target` drawn from
    /// `category`, truncated toward zero.
    #[must_use]
    pub fn reward(
        &self,
        catalog: &Catalog,
        rarity: &RarityPolicy,
        category: &str,
        target: EntityId,
        goal: u32,
    ) -> u64 {
        let reward = f64::from(goal)
            * self.tuning.reward_multiplier
            * catalog.category_difficulty(category)
            * rarity.xp_multiplier(target);
        reward as u64
    }
}

fn pick_member<R: Rng + ?Sized>(
    category: &EnemyCategory,
    recent: &[EntityId],
    rng: &mut R,
) -> Result<EntityId, GenerationError> {
    let fresh: Vec<EntityId> = category
        .members()
        .iter()
        .copied()
        .filter(|member| !recent.contains(member))
        .collect();
    let pool: &[EntityId] = if fresh.is_empty() {
        category.members()
    } else {
        &fresh
    };
    pool.choose(rng)
        .copied()
        .ok_or_else(|| GenerationError::EmptyCategory {
            category: category.name().to_owned(),
        })
}
