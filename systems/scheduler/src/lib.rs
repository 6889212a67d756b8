#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick and notification driven orchestration of the world progression.
//!
//! The [`Scheduler`] owns the [`World`] and every pure system. Host
//! notifications arrive one at a time; each handler mutates the world through
//! [`world_level_world::apply`] and returns synchronously. The only suspension
//! point is the economy: task payouts are handed back as a [`PendingPayout`]
//! for the caller to await, and reroll fees are awaited inline under the same
//! lock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use world_level_catalog::{Catalog, RarityPolicy, VariantGroup};
use world_level_core::{ActorId, Command, EntityId, Event, Task};
use world_level_system_boss_gate::{BossGate, SpawnDecision};
use world_level_system_progression::MINIMUM_LEVEL;
use world_level_system_reroll::{next_utc_midnight, reset_due, RerollLimiter};
use world_level_system_task_generation::{GenerationRequest, TaskGenerator};
use world_level_world::{apply, query, World, WorldSnapshot};

mod commands;
mod config;
mod narration;
mod payout;
mod ports;

use commands::{AdminCommand, WorldLevelCommand};

pub use commands::{CommandError, Invoker, RerollError};
pub use config::{BroadcastPolicy, ConfigError, EngineConfig, RewardPolicy};
pub use payout::{PayoutReport, PendingPayout};
pub use ports::{Economy, Host};

/// Drives the world from host ticks, kill notifications, spawn requests, and
/// player commands.
pub struct Scheduler {
    world: World,
    catalog: Catalog,
    rarity: RarityPolicy,
    generator: TaskGenerator,
    limiter: RerollLimiter,
    rewards: RewardPolicy,
    reroll_cost: u64,
    progress_interval: Duration,
    rng: ChaCha8Rng,
    economy: Arc<dyn Economy>,
    host: Arc<dyn Host>,
    economy_lock: Arc<Mutex<()>>,
    last_progress_broadcast: Option<DateTime<Utc>>,
    dirty: bool,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("world", &self.world)
            .field("last_progress_broadcast", &self.last_progress_broadcast)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Creates a scheduler around an existing world.
    #[must_use]
    pub fn new(
        world: World,
        catalog: Catalog,
        config: &EngineConfig,
        economy: Arc<dyn Economy>,
        host: Arc<dyn Host>,
    ) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let interval_ms = i64::try_from(config.broadcast.progress_interval_ms).unwrap_or(i64::MAX);
        Self {
            world,
            catalog,
            rarity: RarityPolicy::new(config.rarity.clone()),
            generator: TaskGenerator::new(config.tasks),
            limiter: RerollLimiter::from_policy(&config.rerolls),
            rewards: config.rewards.clone(),
            reroll_cost: config.rerolls.cost,
            progress_interval: Duration::milliseconds(interval_ms.min(i64::from(u32::MAX))),
            rng: ChaCha8Rng::seed_from_u64(seed),
            economy,
            host,
            economy_lock: Arc::new(Mutex::new(())),
            last_progress_broadcast: None,
            dirty: false,
        }
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Catalog the scheduler draws tasks from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Persisted representation of the current world.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        query::snapshot(&self.world)
    }

    /// Reports whether the world changed since the last call and clears the
    /// flag. Callers persist the snapshot whenever this returns `true`.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Periodic host tick.
    ///
    /// Runs the daily reroll reset when due, generates a task when none is
    /// active, and completes the active task once its goal is met.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> Option<PendingPayout> {
        self.reset_rerolls_if_due(now);

        match query::active_task(&self.world).map(Task::is_complete) {
            None => {
                let _ = self.generate_task();
                None
            }
            Some(true) => self.complete_task(),
            Some(false) => None,
        }
    }

    /// Kill notification for `entity` credited to `actor`.
    ///
    /// Kills that do not match the active task are ignored. Every matching
    /// kill is counted; only the public progress line is rate limited.
    pub fn on_kill(
        &mut self,
        actor: ActorId,
        display_name: &str,
        entity: EntityId,
        now: DateTime<Utc>,
    ) -> Option<PendingPayout> {
        let target = match query::active_task(&self.world) {
            Some(task) if !task.is_complete() => task.target,
            _ => return None,
        };
        if !self.catalog.is_valid_kill(target, entity) {
            debug!(%entity, task_target = %target, "kill does not match the active task");
            return None;
        }

        let events = self.execute(Command::RecordKill {
            actor,
            display_name: display_name.to_owned(),
        });
        let (actor_kills, progress, goal) = events.iter().find_map(|event| match event {
            Event::KillRecorded {
                actor_kills,
                progress,
                goal,
                ..
            } => Some((*actor_kills, *progress, *goal)),
            _ => None,
        })?;

        let group = self.catalog.variant_group(entity).map(VariantGroup::name);
        self.host
            .whisper(actor, &narration::contribution(group, actor_kills, goal));

        let broadcast_due = self
            .last_progress_broadcast
            .map_or(true, |last| now - last >= self.progress_interval);
        if broadcast_due {
            self.host.broadcast(&narration::progress(progress, goal));
            self.last_progress_broadcast = Some(now);
        }

        if progress >= goal {
            return self.complete_task();
        }
        None
    }

    /// Spawn request packet sent by the player in `sender_slot`.
    ///
    /// Denial lines are whispered to `actor`; malformed packets are denied.
    pub fn on_spawn_request(
        &self,
        actor: ActorId,
        sender_slot: i16,
        payload: &[u8],
    ) -> SpawnDecision {
        let level = query::level(&self.world);
        let decision = BossGate::new(&self.catalog).decide_packet(payload, sender_slot, level);
        match decision {
            SpawnDecision::Rejected { reason } => {
                warn!(%actor, %reason, "malformed spawn request denied");
            }
            SpawnDecision::Denied { boss, .. } => {
                info!(%actor, %boss, level, "boss spawn blocked");
            }
            SpawnDecision::Allowed { .. } | SpawnDecision::NotABoss { .. } => {}
        }
        for line in decision.messages() {
            self.host.whisper(actor, &line);
        }
        decision
    }

    /// Discards the active task for a fee and generates a replacement.
    ///
    /// The fee is debited under the economy lock. When any check or the
    /// debit fails the world is left untouched and the reason is whispered
    /// to the actor.
    pub async fn reroll(&mut self, actor: ActorId, now: DateTime<Utc>) -> Result<Task, RerollError> {
        self.reset_rerolls_if_due(now);

        let Some(previous) = query::active_task(&self.world).map(|task| task.target) else {
            return self.refuse(actor, RerollError::NoActiveTask);
        };
        let record = query::reroll_record(&self.world, actor);
        if let Err(denial) =
            self.limiter
                .check(&record, now, query::next_reroll_reset(&self.world))
        {
            return self.refuse(actor, RerollError::Limited(denial));
        }

        let cost = self.reroll_cost;
        let charged = {
            let _guard = self.economy_lock.lock().await;
            let fee = i64::try_from(cost).unwrap_or(i64::MAX);
            self.economy.adjust_balance(actor, -fee).await
        };
        if !charged {
            return self.refuse(
                actor,
                RerollError::InsufficientFunds {
                    cost,
                    currency: self.rewards.currency.clone(),
                },
            );
        }

        let _ = self.execute(Command::RememberEntity { entity: previous });
        let _ = self.execute(Command::ClearTask);
        let _ = self.execute(Command::ClearContributions);
        let task = self.generate_task();
        let _ = self.execute(Command::ConsumeReroll { actor, at: now });

        let remaining = self
            .limiter
            .remaining_today(&query::reroll_record(&self.world, actor));
        info!(%actor, %previous, next = %task.target, remaining, "task rerolled");
        self.host.whisper(
            actor,
            &format!(
                "Task rerolled! {cost} {} have been deducted.",
                self.rewards.currency
            ),
        );
        self.host.whisper(
            actor,
            &format!("You have {remaining} rerolls remaining today."),
        );
        Ok(task)
    }

    /// Runs a `/wl` command. Replies and errors are whispered to the invoker.
    pub async fn handle_command(
        &mut self,
        invoker: &Invoker,
        args: &[&str],
        now: DateTime<Utc>,
    ) -> Result<(), CommandError> {
        let command = match commands::parse(args, invoker.is_admin) {
            Ok(command) => command,
            Err(error) => {
                debug!(actor = %invoker.actor, %error, "command refused");
                self.host.whisper(invoker.actor, &error.to_string());
                return Err(error);
            }
        };

        match command {
            WorldLevelCommand::Help => {
                let lines = narration::help(
                    invoker.is_admin,
                    self.reroll_cost,
                    &self.rewards.currency,
                    self.limiter.daily_cap(),
                );
                self.whisper_all(invoker.actor, &lines);
            }
            WorldLevelCommand::Status => {
                let lines = narration::status(
                    query::ledger(&self.world),
                    self.host.is_hardmode_active(),
                );
                self.whisper_all(invoker.actor, &lines);
            }
            WorldLevelCommand::Task => {
                let task = query::active_task(&self.world);
                let definition = task
                    .and_then(|task| task.bosses.first())
                    .and_then(|boss| self.catalog.boss(*boss));
                let target_name = task
                    .map(|task| self.host.entity_name(task.target))
                    .unwrap_or_default();
                let lines = narration::task_details(task, definition, &target_name);
                self.whisper_all(invoker.actor, &lines);
            }
            WorldLevelCommand::Reroll => {
                let _ = self.reroll(invoker.actor, now).await?;
            }
            WorldLevelCommand::Admin(admin) => self.run_admin(invoker, admin),
        }
        Ok(())
    }

    fn run_admin(&mut self, invoker: &Invoker, command: AdminCommand) {
        info!(actor = %invoker.actor, name = %invoker.name, ?command, "admin command");
        match command {
            AdminCommand::SetLevel(level) => {
                let level = level.max(MINIMUM_LEVEL);
                let _ = self.execute(Command::SetWorldLevel { level });
                self.host
                    .whisper(invoker.actor, &format!("World level set to {level}"));
            }
            AdminCommand::AddXp(amount) => {
                let events = self.execute(Command::GrantExperience { amount });
                self.announce_levels_reached(&events);
                let ledger = query::ledger(&self.world);
                self.host.whisper(
                    invoker.actor,
                    &format!(
                        "Added {amount} XP to world (Current: {}/{})",
                        ledger.current_xp(),
                        ledger.required_xp()
                    ),
                );
            }
            AdminCommand::NewTask => {
                let _ = self.execute(Command::ClearTask);
                let _ = self.execute(Command::ClearContributions);
                let _ = self.generate_task();
                self.host.whisper(invoker.actor, "Generating new task...");
            }
            AdminCommand::UpdateXp => {
                let events = self.execute(Command::RecalculateRequirement);
                self.announce_levels_reached(&events);
                let lines = narration::requirements_updated(query::ledger(&self.world));
                self.whisper_all(invoker.actor, &lines);
            }
        }
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        if !events.is_empty() {
            self.dirty = true;
        }
        events
    }

    fn generate_task(&mut self) -> Task {
        let recent = query::recent_entities(&self.world);
        let request = GenerationRequest {
            level: query::level(&self.world),
            hardmode_active: self.host.is_hardmode_active(),
            recent: &recent,
        };
        let generated = self
            .generator
            .generate(&self.catalog, &self.rarity, request, &mut self.rng);

        if generated.memory_cleared {
            let _ = self.execute(Command::ForgetRecentEntities);
        }
        let _ = self.execute(Command::RememberEntity {
            entity: generated.task.target,
        });
        let _ = self.execute(Command::AssignTask {
            task: generated.task.clone(),
        });

        let target_name = self.host.entity_name(generated.task.target);
        let lines =
            narration::task_announcement(query::level(&self.world), &generated.task, &target_name);
        for line in &lines {
            self.host.broadcast(line);
        }
        generated.task
    }

    fn complete_task(&mut self) -> Option<PendingPayout> {
        let task = query::active_task(&self.world)?.clone();
        let level = query::level(&self.world);
        let contributions = query::contributions(&self.world);
        let shares = contributions.compute_shares(self.rewards.pool_for(level));
        let top = contributions
            .top_contributor()
            .map(|record| narration::top_contributor(&record.display_name, record.kills));
        if let Some(line) = top {
            self.host.broadcast(&line);
        }

        let _ = self.execute(Command::ClearContributions);
        let events = self.execute(Command::GrantExperience {
            amount: task.reward_xp,
        });
        let new_level = events
            .iter()
            .filter_map(|event| match event {
                Event::LevelReached { level, .. } => Some(*level),
                _ => None,
            })
            .last();
        for line in narration::completion(task.reward_xp, new_level) {
            self.host.broadcast(&line);
        }
        let _ = self.execute(Command::ClearTask);
        self.last_progress_broadcast = None;

        info!(
            entity = %task.target,
            reward = task.reward_xp,
            level = query::level(&self.world),
            contributors = shares.len(),
            "task completed"
        );

        if shares.is_empty() {
            return None;
        }
        Some(PendingPayout::new(
            Arc::clone(&self.economy),
            Arc::clone(&self.host),
            Arc::clone(&self.economy_lock),
            self.rewards.currency.clone(),
            shares,
        ))
    }

    fn reset_rerolls_if_due(&mut self, now: DateTime<Utc>) {
        if !reset_due(now, query::next_reroll_reset(&self.world)) {
            return;
        }
        let next_reset = next_utc_midnight(now);
        let _ = self.execute(Command::ResetRerolls { next_reset });
        info!(%next_reset, "daily rerolls reset");
        self.host
            .broadcast("Daily task reroll attempts have been reset!");
    }

    fn announce_levels_reached(&self, events: &[Event]) {
        for event in events {
            if let Event::LevelReached { level, .. } = event {
                self.host
                    .broadcast(&format!("World has reached level {level}!"));
            }
        }
    }

    fn refuse<T>(&self, actor: ActorId, error: RerollError) -> Result<T, RerollError> {
        debug!(%actor, %error, "reroll refused");
        self.host.whisper(actor, &error.to_string());
        Err(error)
    }

    fn whisper_all(&self, actor: ActorId, lines: &[String]) {
        for line in lines {
            self.host.whisper(actor, line);
        }
    }
}
