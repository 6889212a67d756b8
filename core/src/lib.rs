#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the World Level engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The scheduler submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what changed. Systems read immutable snapshots and answer with new command
//! batches or pure decisions.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of recently targeted entities remembered to avoid repeated tasks.
pub const RECENT_TASK_CAPACITY: usize = 5;

/// Identifier of a game entity (enemy type) as reported by the host runtime.
///
/// Negative values are valid and denote host-specific variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(i32);

impl EntityId {
    /// Creates a new entity identifier.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the raw host identifier.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a player account that can contribute kills or issue commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw account identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable symbolic tag for every boss encounter the engine can gate.
///
/// Tags are persisted by name. Names that do not match a known boss decode to
/// [`Boss::Unknown`] instead of silently aliasing another boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Boss {
    /// King Slime.
    KingSlime,
    /// Eye of Cthulhu.
    EyeOfCthulhu,
    /// Eater of Worlds.
    EaterOfWorlds,
    /// Brain of Cthulhu.
    BrainOfCthulhu,
    /// Queen Bee.
    QueenBee,
    /// Deerclops.
    Deerclops,
    /// Skeletron.
    Skeletron,
    /// Wall of Flesh.
    WallOfFlesh,
    /// Queen Slime.
    QueenSlime,
    /// The Destroyer.
    TheDestroyer,
    /// The Twins, a cooperating pair sharing a single unlock.
    TheTwins,
    /// Skeletron Prime.
    SkeletronPrime,
    /// Plantera.
    Plantera,
    /// Golem.
    Golem,
    /// Duke Fishron.
    DukeFishron,
    /// Empress of Light.
    EmpressOfLight,
    /// Lunatic Cultist.
    LunaticCultist,
    /// Moon Lord.
    MoonLord,
    /// Any tag that could not be resolved to a known boss.
    Unknown,
}

impl Boss {
    /// Every known boss in progression order. [`Boss::Unknown`] is excluded.
    pub const ALL: [Boss; 18] = [
        Boss::KingSlime,
        Boss::EyeOfCthulhu,
        Boss::EaterOfWorlds,
        Boss::BrainOfCthulhu,
        Boss::QueenBee,
        Boss::Deerclops,
        Boss::Skeletron,
        Boss::WallOfFlesh,
        Boss::QueenSlime,
        Boss::TheDestroyer,
        Boss::TheTwins,
        Boss::SkeletronPrime,
        Boss::Plantera,
        Boss::Golem,
        Boss::DukeFishron,
        Boss::EmpressOfLight,
        Boss::LunaticCultist,
        Boss::MoonLord,
    ];

    /// Stable tag used when persisting the boss.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Boss::KingSlime => "KingSlime",
            Boss::EyeOfCthulhu => "EyeOfCthulhu",
            Boss::EaterOfWorlds => "EaterOfWorlds",
            Boss::BrainOfCthulhu => "BrainOfCthulhu",
            Boss::QueenBee => "QueenBee",
            Boss::Deerclops => "Deerclops",
            Boss::Skeletron => "Skeletron",
            Boss::WallOfFlesh => "WallOfFlesh",
            Boss::QueenSlime => "QueenSlime",
            Boss::TheDestroyer => "TheDestroyer",
            Boss::TheTwins => "TheTwins",
            Boss::SkeletronPrime => "SkeletronPrime",
            Boss::Plantera => "Plantera",
            Boss::Golem => "Golem",
            Boss::DukeFishron => "DukeFishron",
            Boss::EmpressOfLight => "EmpressOfLight",
            Boss::LunaticCultist => "LunaticCultist",
            Boss::MoonLord => "MoonLord",
            Boss::Unknown => "Unknown",
        }
    }

    /// Resolves a persisted tag, yielding [`Boss::Unknown`] for unrecognised input.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|boss| boss.tag() == tag.trim())
            .unwrap_or(Boss::Unknown)
    }
}

impl fmt::Display for Boss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Boss {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_tag(value))
    }
}

impl From<String> for Boss {
    fn from(value: String) -> Self {
        Self::from_tag(&value)
    }
}

impl From<Boss> for String {
    fn from(value: Boss) -> Self {
        value.tag().to_owned()
    }
}

/// Rarity classification that controls kill quotas and experience multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    /// Common enemies.
    Normal,
    /// Aggressive enemies worth slightly more.
    Hostile,
    /// Uncommon enemies with short quotas.
    Special,
    /// Extremely rare enemies; quotas ignore level scaling.
    SuperRare,
}

/// Kind of objective a task represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskKind {
    /// Defeat a number of a given enemy type.
    #[serde(rename = "KILL_ENEMIES")]
    KillEnemies,
}

/// Kill objective shared by every player in the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// Objective category.
    pub kind: TaskKind,
    /// Entity whose kills count toward the goal.
    pub target: EntityId,
    /// Bosses this task prepares the world for.
    pub bosses: Vec<Boss>,
    /// Catalog category the target was drawn from.
    pub category: String,
    /// Valid kills recorded so far.
    pub progress: u32,
    /// Kills required to complete the task.
    pub goal: u32,
    /// Experience granted to the world on completion.
    pub reward_xp: u64,
}

impl Task {
    /// Creates a fresh kill task with no recorded progress.
    #[must_use]
    pub fn kill(
        target: EntityId,
        bosses: Vec<Boss>,
        category: impl Into<String>,
        goal: u32,
        reward_xp: u64,
    ) -> Self {
        Self {
            kind: TaskKind::KillEnemies,
            target,
            bosses,
            category: category.into(),
            progress: 0,
            goal: goal.max(1),
            reward_xp,
        }
    }

    /// Display label joining the associated bosses with `/`.
    #[must_use]
    pub fn boss_label(&self) -> String {
        self.bosses
            .iter()
            .map(|boss| boss.tag())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Reports whether the recorded progress reached the goal.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= self.goal
    }

    /// Completion expressed as a whole percentage.
    #[must_use]
    pub fn percent_complete(&self) -> u32 {
        let scaled = u64::from(self.progress.min(self.goal)) * 100;
        (scaled / u64::from(self.goal.max(1))) as u32
    }
}

/// Per-actor reroll usage persisted across tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RerollRecord {
    /// Moment of the actor's most recent successful reroll, if any.
    pub last_reroll_at: Option<DateTime<Utc>>,
    /// Successful rerolls since the last daily reset.
    pub used_today: u32,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a freshly generated task as the active objective.
    AssignTask {
        /// Task to activate.
        task: Task,
    },
    /// Records a validated kill toward the active task.
    RecordKill {
        /// Account credited with the kill.
        actor: ActorId,
        /// Name shown when announcing the actor's contribution.
        display_name: String,
    },
    /// Drops every contribution record for the active task.
    ClearContributions,
    /// Adds experience to the world and settles any level-ups.
    GrantExperience {
        /// Experience to add.
        amount: u64,
    },
    /// Administrative override of the world level.
    SetWorldLevel {
        /// Level to install.
        level: u32,
    },
    /// Recomputes the experience requirement for the current level.
    RecalculateRequirement,
    /// Removes the active task.
    ClearTask,
    /// Pushes an entity onto the bounded recent-task memory.
    RememberEntity {
        /// Entity to remember.
        entity: EntityId,
    },
    /// Empties the recent-task memory.
    ForgetRecentEntities,
    /// Charges one reroll to the actor.
    ConsumeReroll {
        /// Actor who rerolled.
        actor: ActorId,
        /// Moment the reroll succeeded.
        at: DateTime<Utc>,
    },
    /// Clears every actor's daily reroll counter.
    ResetRerolls {
        /// Next daily boundary to wait for.
        next_reset: DateTime<Utc>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A task became the active objective.
    TaskAssigned {
        /// Newly active task.
        task: Task,
    },
    /// A kill was counted toward the active task.
    KillRecorded {
        /// Account credited with the kill.
        actor: ActorId,
        /// Kills the actor contributed to this task so far.
        actor_kills: u32,
        /// Task progress after the kill.
        progress: u32,
        /// Task goal.
        goal: u32,
    },
    /// Contribution records were cleared.
    ContributionsCleared,
    /// Experience was added to the world.
    ExperienceGranted {
        /// Experience added.
        amount: u64,
        /// Experience toward the next level after settling.
        current: u64,
        /// Experience required for the next level after settling.
        required: u64,
    },
    /// The world advanced to a new level through accumulated experience.
    LevelReached {
        /// Level reached.
        level: u32,
        /// Requirement for the following level.
        required: u64,
    },
    /// An administrator replaced the world level.
    WorldLevelOverridden {
        /// Level before the override.
        previous: u32,
        /// Level after the override.
        level: u32,
    },
    /// The requirement for the current level was recomputed.
    RequirementRecalculated {
        /// Requirement after recomputation.
        required: u64,
    },
    /// The active task was removed.
    TaskCleared {
        /// Task that was removed.
        task: Task,
    },
    /// An entity was pushed onto the recent-task memory.
    EntityRemembered {
        /// Entity remembered.
        entity: EntityId,
        /// Entity evicted to respect the capacity, if any.
        evicted: Option<EntityId>,
    },
    /// The recent-task memory was emptied.
    RecentEntitiesForgotten,
    /// An actor spent a reroll.
    RerollConsumed {
        /// Actor who rerolled.
        actor: ActorId,
        /// Rerolls the actor used since the last reset.
        used_today: u32,
    },
    /// Every actor's daily reroll counter was cleared.
    RerollsReset {
        /// Next scheduled reset.
        next_reset: DateTime<Utc>,
    },
}
