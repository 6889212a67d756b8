//! Persisted representation of the world.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use world_level_core::{ActorId, Boss, EntityId, RerollRecord, Task, TaskKind};
use world_level_system_contribution::ContributionTracker;
use world_level_system_progression::{ProgressionLedger, XpCurve};

use crate::World;

/// Serializable copy of the world, one JSON object per save file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// World level.
    #[serde(default)]
    pub world_level: u32,
    /// Experience toward the next level.
    #[serde(rename = "currentXP", default)]
    pub current_xp: u64,
    /// Experience required for the next level.
    #[serde(rename = "requiredXP", default)]
    pub required_xp: u64,
    /// Active task, if any.
    #[serde(default)]
    pub current_task: Option<TaskSnapshot>,
    /// Legacy unlock list kept for compatibility with older save files.
    #[serde(default)]
    pub unlocked_bosses: Vec<i32>,
    /// Next daily reroll reset boundary.
    #[serde(default)]
    pub next_reroll_reset: Option<DateTime<Utc>>,
    /// Reroll usage per actor.
    #[serde(default)]
    pub player_rerolls: BTreeMap<ActorId, RerollSnapshot>,
    /// Recently targeted entities, oldest first.
    #[serde(rename = "recentTaskNPCs", default)]
    pub recent_task_npcs: Vec<EntityId>,
}

/// Persisted form of the active task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// Objective kind.
    pub task_type: TaskKind,
    /// Entity whose kills count.
    pub target_mob_id: EntityId,
    /// Kills recorded.
    pub progress: u32,
    /// Kills required.
    pub goal: u32,
    /// Experience granted on completion.
    #[serde(rename = "rewardXP")]
    pub reward_xp: u64,
    /// Bosses the task prepares for. Older files store a single tag.
    #[serde(default, deserialize_with = "one_or_many_bosses")]
    pub associated_boss: Vec<Boss>,
    /// Catalog category of the target.
    #[serde(default)]
    pub category: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BossField {
    One(Boss),
    Many(Vec<Boss>),
}

fn one_or_many_bosses<'de, D>(deserializer: D) -> Result<Vec<Boss>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match BossField::deserialize(deserializer)? {
        BossField::One(boss) => vec![boss],
        BossField::Many(bosses) => bosses,
    })
}

/// Persisted reroll usage of one actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerollSnapshot {
    /// Moment of the last successful reroll.
    #[serde(default)]
    pub last_reroll_time: Option<DateTime<Utc>>,
    /// Rerolls used since the last reset.
    #[serde(default)]
    pub rerolls_used: u32,
}

impl From<&Task> for TaskSnapshot {
    fn from(task: &Task) -> Self {
        Self {
            task_type: task.kind,
            target_mob_id: task.target,
            progress: task.progress,
            goal: task.goal,
            reward_xp: task.reward_xp,
            associated_boss: task.bosses.clone(),
            category: task.category.clone(),
        }
    }
}

impl From<TaskSnapshot> for Task {
    fn from(snapshot: TaskSnapshot) -> Self {
        let goal = snapshot.goal.max(1);
        Task {
            kind: snapshot.task_type,
            target: snapshot.target_mob_id,
            bosses: snapshot.associated_boss,
            category: snapshot.category,
            progress: snapshot.progress.min(goal),
            goal,
            reward_xp: snapshot.reward_xp,
        }
    }
}

impl From<RerollRecord> for RerollSnapshot {
    fn from(record: RerollRecord) -> Self {
        Self {
            last_reroll_time: record.last_reroll_at,
            rerolls_used: record.used_today,
        }
    }
}

impl From<RerollSnapshot> for RerollRecord {
    fn from(snapshot: RerollSnapshot) -> Self {
        Self {
            last_reroll_at: snapshot.last_reroll_time,
            used_today: snapshot.rerolls_used,
        }
    }
}

impl WorldSnapshot {
    pub(crate) fn capture(world: &World) -> Self {
        Self {
            world_level: world.ledger.level(),
            current_xp: world.ledger.current_xp(),
            required_xp: world.ledger.required_xp(),
            current_task: world.active_task.as_ref().map(TaskSnapshot::from),
            unlocked_bosses: world.unlocked_bosses.clone(),
            next_reroll_reset: Some(world.next_reroll_reset),
            player_rerolls: world
                .rerolls
                .iter()
                .map(|(actor, record)| (*actor, RerollSnapshot::from(*record)))
                .collect(),
            recent_task_npcs: world.recent.iter().copied().collect(),
        }
    }
}

impl World {
    /// Rebuilds a world from a snapshot.
    ///
    /// The level is floored at one, a missing requirement is recomputed from
    /// `curve`, task progress is capped at its goal, the recent memory keeps
    /// only its newest `recent_capacity` entries, and a missing reset boundary
    /// is replaced by `fallback_reset`. Contributions are never persisted and
    /// start empty.
    #[must_use]
    pub fn restore(
        snapshot: WorldSnapshot,
        curve: XpCurve,
        recent_capacity: usize,
        fallback_reset: DateTime<Utc>,
    ) -> Self {
        let recent_capacity = recent_capacity.max(1);
        let skip = snapshot
            .recent_task_npcs
            .len()
            .saturating_sub(recent_capacity);
        let recent: VecDeque<EntityId> =
            snapshot.recent_task_npcs.into_iter().skip(skip).collect();

        Self {
            ledger: ProgressionLedger::restore(
                curve,
                snapshot.world_level,
                snapshot.current_xp,
                snapshot.required_xp,
            ),
            active_task: snapshot.current_task.map(Task::from),
            contributions: ContributionTracker::new(),
            recent,
            recent_capacity,
            rerolls: snapshot
                .player_rerolls
                .into_iter()
                .map(|(actor, record)| (actor, RerollRecord::from(record)))
                .collect(),
            next_reroll_reset: snapshot.next_reroll_reset.unwrap_or(fallback_reset),
            unlocked_bosses: snapshot.unlocked_bosses,
        }
    }
}
