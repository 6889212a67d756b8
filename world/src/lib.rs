#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world progression state.
//!
//! The [`World`] aggregate owns the level ledger, the active task, the
//! contribution table, the recent-target memory, and every actor's reroll
//! usage. It only changes through [`apply`], which executes one [`Command`]
//! and reports what changed as [`Event`] values. Reads go through [`query`].

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use world_level_core::{ActorId, Command, EntityId, Event, RerollRecord, Task};
use world_level_system_contribution::ContributionTracker;
use world_level_system_progression::{LevelUp, ProgressionLedger, XpCurve};

mod snapshot;

pub use snapshot::{RerollSnapshot, TaskSnapshot, WorldSnapshot};

/// Represents the authoritative world progression state.
#[derive(Clone, Debug)]
pub struct World {
    ledger: ProgressionLedger,
    active_task: Option<Task>,
    contributions: ContributionTracker,
    recent: VecDeque<EntityId>,
    recent_capacity: usize,
    rerolls: BTreeMap<ActorId, RerollRecord>,
    next_reroll_reset: DateTime<Utc>,
    unlocked_bosses: Vec<i32>,
}

impl World {
    /// Creates a fresh world at the minimum level with no active task.
    #[must_use]
    pub fn new(curve: XpCurve, recent_capacity: usize, next_reroll_reset: DateTime<Utc>) -> Self {
        Self {
            ledger: ProgressionLedger::new(curve),
            active_task: None,
            contributions: ContributionTracker::new(),
            recent: VecDeque::with_capacity(recent_capacity),
            recent_capacity: recent_capacity.max(1),
            rerolls: BTreeMap::new(),
            next_reroll_reset,
            unlocked_bosses: Vec::new(),
        }
    }

    fn remember(&mut self, entity: EntityId) -> Option<EntityId> {
        if let Some(index) = self.recent.iter().position(|known| *known == entity) {
            let _ = self.recent.remove(index);
            self.recent.push_back(entity);
            return None;
        }
        let evicted = if self.recent.len() >= self.recent_capacity {
            self.recent.pop_front()
        } else {
            None
        };
        self.recent.push_back(entity);
        evicted
    }

    fn push_level_ups(level_ups: Vec<LevelUp>, out_events: &mut Vec<Event>) {
        out_events.extend(level_ups.into_iter().map(|up| Event::LevelReached {
            level: up.level,
            required: up.required,
        }));
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::AssignTask { task } => {
            world.active_task = Some(task.clone());
            out_events.push(Event::TaskAssigned { task });
        }
        Command::RecordKill {
            actor,
            display_name,
        } => {
            let Some(task) = world.active_task.as_mut() else {
                return;
            };
            if task.is_complete() {
                return;
            }
            task.progress += 1;
            let actor_kills = world.contributions.record_kill(actor, &display_name);
            out_events.push(Event::KillRecorded {
                actor,
                actor_kills,
                progress: task.progress,
                goal: task.goal,
            });
        }
        Command::ClearContributions => {
            world.contributions.clear();
            out_events.push(Event::ContributionsCleared);
        }
        Command::GrantExperience { amount } => {
            let mut level_ups = Vec::new();
            world.ledger.grant(amount, &mut level_ups);
            out_events.push(Event::ExperienceGranted {
                amount,
                current: world.ledger.current_xp(),
                required: world.ledger.required_xp(),
            });
            World::push_level_ups(level_ups, out_events);
        }
        Command::SetWorldLevel { level } => {
            let previous = world.ledger.set_level(level);
            out_events.push(Event::WorldLevelOverridden { previous, level });
        }
        Command::RecalculateRequirement => {
            let mut level_ups = Vec::new();
            world.ledger.recalculate(&mut level_ups);
            out_events.push(Event::RequirementRecalculated {
                required: world.ledger.required_xp(),
            });
            World::push_level_ups(level_ups, out_events);
        }
        Command::ClearTask => {
            if let Some(task) = world.active_task.take() {
                out_events.push(Event::TaskCleared { task });
            }
        }
        Command::RememberEntity { entity } => {
            let evicted = world.remember(entity);
            out_events.push(Event::EntityRemembered { entity, evicted });
        }
        Command::ForgetRecentEntities => {
            world.recent.clear();
            out_events.push(Event::RecentEntitiesForgotten);
        }
        Command::ConsumeReroll { actor, at } => {
            let record = world.rerolls.entry(actor).or_default();
            record.last_reroll_at = Some(at);
            record.used_today = record.used_today.saturating_add(1);
            out_events.push(Event::RerollConsumed {
                actor,
                used_today: record.used_today,
            });
        }
        Command::ResetRerolls { next_reset } => {
            for record in world.rerolls.values_mut() {
                record.used_today = 0;
            }
            world.next_reroll_reset = next_reset;
            out_events.push(Event::RerollsReset { next_reset });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use chrono::{DateTime, Utc};
    use world_level_core::{ActorId, EntityId, RerollRecord, Task};
    use world_level_system_contribution::ContributionTracker;
    use world_level_system_progression::ProgressionLedger;

    use super::{World, WorldSnapshot};

    /// Current world level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.ledger.level()
    }

    /// Read-only access to the level ledger.
    #[must_use]
    pub fn ledger(world: &World) -> &ProgressionLedger {
        &world.ledger
    }

    /// Task currently being worked on, if any.
    #[must_use]
    pub fn active_task(world: &World) -> Option<&Task> {
        world.active_task.as_ref()
    }

    /// Contribution table for the active task.
    #[must_use]
    pub fn contributions(world: &World) -> &ContributionTracker {
        &world.contributions
    }

    /// Recently targeted entities, oldest first.
    #[must_use]
    pub fn recent_entities(world: &World) -> Vec<EntityId> {
        world.recent.iter().copied().collect()
    }

    /// Reroll usage of an actor; actors who never rerolled get a blank record.
    #[must_use]
    pub fn reroll_record(world: &World, actor: ActorId) -> RerollRecord {
        world.rerolls.get(&actor).copied().unwrap_or_default()
    }

    /// Next daily reroll reset boundary.
    #[must_use]
    pub fn next_reroll_reset(world: &World) -> DateTime<Utc> {
        world.next_reroll_reset
    }

    /// Captures the persisted representation of the world.
    #[must_use]
    pub fn snapshot(world: &World) -> WorldSnapshot {
        WorldSnapshot::capture(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use world_level_core::Boss;

    fn reset_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-02T00:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn world() -> World {
        World::new(XpCurve::new(100, 2.0), 3, reset_at())
    }

    fn task(goal: u32) -> Task {
        Task::kill(EntityId::new(3), vec![Boss::Skeletron], "Forest/Surface", goal, 50)
    }

    #[test]
    fn kills_without_a_task_are_ignored() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RecordKill {
                actor: ActorId::new(1),
                display_name: "ana".into(),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert!(query::contributions(&world).is_empty());
    }

    #[test]
    fn progress_stops_at_the_goal() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::AssignTask { task: task(2) }, &mut events);
        for _ in 0..3 {
            apply(
                &mut world,
                Command::RecordKill {
                    actor: ActorId::new(1),
                    display_name: "ana".into(),
                },
                &mut events,
            );
        }
        let active = query::active_task(&world).expect("active task");
        assert_eq!(active.progress, 2);
        assert!(active.is_complete());
        assert_eq!(query::contributions(&world).kills(ActorId::new(1)), 2);
    }

    #[test]
    fn recent_memory_evicts_oldest_first() {
        let mut world = world();
        let mut events = Vec::new();
        for id in 1..=4 {
            apply(
                &mut world,
                Command::RememberEntity {
                    entity: EntityId::new(id),
                },
                &mut events,
            );
        }
        assert_eq!(
            query::recent_entities(&world),
            vec![EntityId::new(2), EntityId::new(3), EntityId::new(4)]
        );
        assert_eq!(
            events.last(),
            Some(&Event::EntityRemembered {
                entity: EntityId::new(4),
                evicted: Some(EntityId::new(1)),
            })
        );
    }

    #[test]
    fn remembering_a_known_entity_moves_it_to_the_back() {
        let mut world = world();
        let mut events = Vec::new();
        for id in [1, 2, 3, 1] {
            apply(
                &mut world,
                Command::RememberEntity {
                    entity: EntityId::new(id),
                },
                &mut events,
            );
        }
        assert_eq!(
            query::recent_entities(&world),
            vec![EntityId::new(2), EntityId::new(3), EntityId::new(1)]
        );
        assert_eq!(
            events.last(),
            Some(&Event::EntityRemembered {
                entity: EntityId::new(1),
                evicted: None,
            })
        );
    }

    #[test]
    fn experience_grant_reports_every_level() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::GrantExperience { amount: 650 }, &mut events);
        assert_eq!(query::level(&world), 3);
        assert_eq!(
            events,
            vec![
                Event::ExperienceGranted {
                    amount: 650,
                    current: 50,
                    required: 800
                },
                Event::LevelReached {
                    level: 2,
                    required: 400
                },
                Event::LevelReached {
                    level: 3,
                    required: 800
                },
            ]
        );
    }

    #[test]
    fn reroll_reset_keeps_last_reroll_time() {
        let mut world = world();
        let mut events = Vec::new();
        let at = reset_at() - Duration::hours(1);
        apply(
            &mut world,
            Command::ConsumeReroll {
                actor: ActorId::new(7),
                at,
            },
            &mut events,
        );
        assert_eq!(query::reroll_record(&world, ActorId::new(7)).used_today, 1);

        let next = reset_at() + Duration::days(1);
        apply(&mut world, Command::ResetRerolls { next_reset: next }, &mut events);
        let record = query::reroll_record(&world, ActorId::new(7));
        assert_eq!(record.used_today, 0);
        assert_eq!(record.last_reroll_at, Some(at));
        assert_eq!(query::next_reroll_reset(&world), next);
    }

    #[test]
    fn clearing_a_missing_task_is_silent() {
        let mut world = world();
        let mut events = Vec::new();
        apply(&mut world, Command::ClearTask, &mut events);
        assert!(events.is_empty());
    }
}
