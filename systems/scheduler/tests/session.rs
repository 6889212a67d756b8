use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use world_level_catalog::Catalog;
use world_level_core::{ActorId, EntityId, Task};
use world_level_system_boss_gate::{SpawnDecision, SpawnRequest};
use world_level_system_progression::XpCurve;
use world_level_system_scheduler::{
    CommandError, Economy, EngineConfig, Host, Invoker, RerollError, Scheduler,
};
use world_level_world::query;

#[derive(Default)]
struct RecordingHost {
    hardmode: bool,
    broadcasts: Mutex<Vec<String>>,
    whispers: Mutex<Vec<(ActorId, String)>>,
}

impl RecordingHost {
    fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().expect("broadcast log").clone()
    }

    fn whispers_to(&self, actor: ActorId) -> Vec<String> {
        self.whispers
            .lock()
            .expect("whisper log")
            .iter()
            .filter(|(to, _)| *to == actor)
            .map(|(_, line)| line.clone())
            .collect()
    }
}

impl Host for RecordingHost {
    fn is_hardmode_active(&self) -> bool {
        self.hardmode
    }

    fn broadcast(&self, message: &str) {
        self.broadcasts
            .lock()
            .expect("broadcast log")
            .push(message.to_owned());
    }

    fn whisper(&self, actor: ActorId, message: &str) {
        self.whispers
            .lock()
            .expect("whisper log")
            .push((actor, message.to_owned()));
    }
}

#[derive(Default)]
struct MemoryEconomy {
    balances: Mutex<BTreeMap<ActorId, i64>>,
}

impl MemoryEconomy {
    fn with_balance(actor: ActorId, amount: i64) -> Self {
        let economy = Self::default();
        let _ = economy
            .balances
            .lock()
            .expect("balances")
            .insert(actor, amount);
        economy
    }

    fn balance(&self, actor: ActorId) -> i64 {
        self.balances
            .lock()
            .expect("balances")
            .get(&actor)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Economy for MemoryEconomy {
    async fn adjust_balance(&self, actor: ActorId, delta: i64) -> bool {
        let mut balances = self.balances.lock().expect("balances");
        let balance = balances.entry(actor).or_default();
        match balance.checked_add(delta) {
            Some(next) if next >= 0 => {
                *balance = next;
                true
            }
            _ => false,
        }
    }
}

const ANA: ActorId = ActorId::new(1);
const BO: ActorId = ActorId::new(2);

fn start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

fn config() -> EngineConfig {
    let mut config = EngineConfig {
        rng_seed: Some(17),
        ..EngineConfig::default()
    };
    config.rarity.super_rare_entities.clear();
    config
}

fn scheduler(
    config: &EngineConfig,
    economy: Arc<MemoryEconomy>,
    host: Arc<RecordingHost>,
) -> Scheduler {
    Scheduler::new(
        config.fresh_world(start()),
        Catalog::standard(),
        config,
        economy,
        host,
    )
}

fn active_task(scheduler: &Scheduler) -> Task {
    query::active_task(scheduler.world())
        .cloned()
        .expect("active task")
}

#[test]
fn first_tick_generates_and_announces_a_task() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));

    assert!(scheduler.on_tick(start()).is_none());

    let task = active_task(&scheduler);
    assert_eq!(task.progress, 0);
    assert!(task.goal >= 1);
    assert_eq!(query::recent_entities(scheduler.world()), vec![task.target]);
    assert!(scheduler.take_dirty());
    assert!(!scheduler.take_dirty());

    let broadcasts = host.broadcasts();
    assert_eq!(broadcasts[0], "[World Level 1] New Task Available!");
    assert!(broadcasts[1].starts_with(&format!("Hunt {} NPC {}", task.goal, task.target)));
    assert_eq!(
        broadcasts[3],
        format!("This will help prepare for {}!", task.boss_label())
    );
}

#[tokio::test]
async fn completion_pays_contributors_in_proportion() {
    let config = config();
    let economy = Arc::new(MemoryEconomy::default());
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config, Arc::clone(&economy), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let task = active_task(&scheduler);

    assert!(scheduler.on_kill(BO, "bo", task.target, start()).is_none());
    let mut payout = None;
    for _ in 1..task.goal {
        payout = scheduler.on_kill(ANA, "ana", task.target, start());
    }
    let payout = payout.expect("final kill completes the task");

    assert!(query::active_task(scheduler.world()).is_none());
    assert!(query::contributions(scheduler.world()).is_empty());
    assert_eq!(query::ledger(scheduler.world()).current_xp(), task.reward_xp);
    assert!(host.broadcasts().contains(&format!(
        "Task Complete! Top contributor: ana with {} kills!",
        task.goal - 1
    )));
    assert!(host
        .broadcasts()
        .contains(&format!("Task Complete! Earned {} XP!", task.reward_xp)));

    let pool = config.rewards.pool_for(1);
    let report = payout.settle().await;
    assert!(report.failed.is_empty());
    assert!(report.total_paid() <= pool);
    let bo_share = pool / u64::from(task.goal);
    assert_eq!(economy.balance(BO), i64::try_from(bo_share).expect("fits"));
    assert_eq!(
        economy.balance(ANA),
        i64::try_from(pool * u64::from(task.goal - 1) / u64::from(task.goal)).expect("fits")
    );
    assert!(host
        .whispers_to(BO)
        .iter()
        .any(|line| line.starts_with("Received ") && line.contains("for contributing 1 kills")));
}

#[test]
fn every_kill_counts_but_progress_broadcasts_are_rate_limited() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let task = active_task(&scheduler);
    assert!(task.goal > 4);

    for _ in 0..3 {
        assert!(scheduler.on_kill(ANA, "ana", task.target, start()).is_none());
    }
    let later = start() + Duration::milliseconds(2_000);
    assert!(scheduler.on_kill(ANA, "ana", task.target, later).is_none());

    assert_eq!(active_task(&scheduler).progress, 4);
    let progress_lines: Vec<String> = host
        .broadcasts()
        .into_iter()
        .filter(|line| line.starts_with("Task Progress"))
        .collect();
    assert_eq!(
        progress_lines,
        vec![
            format!("Task Progress: 1/{}", task.goal),
            format!("Task Progress: 4/{}", task.goal),
        ]
    );
    assert_eq!(host.whispers_to(ANA).len(), 4);
}

#[test]
fn unrelated_kills_are_ignored() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let _ = scheduler.take_dirty();

    assert!(scheduler
        .on_kill(ANA, "ana", EntityId::new(9_999), start())
        .is_none());
    assert_eq!(active_task(&scheduler).progress, 0);
    assert!(!scheduler.take_dirty());
    assert!(host.whispers_to(ANA).is_empty());
}

#[tokio::test]
async fn refused_fee_leaves_the_world_untouched() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let before = active_task(&scheduler);
    let recent = query::recent_entities(scheduler.world());
    let _ = scheduler.take_dirty();

    let error = scheduler
        .reroll(ANA, start())
        .await
        .expect_err("no balance");

    assert_eq!(
        error,
        RerollError::InsufficientFunds {
            cost: 50_000,
            currency: "points".to_owned()
        }
    );
    assert_eq!(active_task(&scheduler), before);
    assert_eq!(query::recent_entities(scheduler.world()), recent);
    assert_eq!(query::reroll_record(scheduler.world(), ANA).used_today, 0);
    assert!(!scheduler.take_dirty());
    assert_eq!(
        host.whispers_to(ANA),
        vec!["You need 50000 points to reroll the task!".to_owned()]
    );
}

#[tokio::test]
async fn reroll_charges_replaces_and_starts_the_cooldown() {
    let economy = Arc::new(MemoryEconomy::with_balance(ANA, 120_000));
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::clone(&economy), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let before = active_task(&scheduler);

    let replacement = scheduler.reroll(ANA, start()).await.expect("reroll");

    assert_eq!(economy.balance(ANA), 70_000);
    assert_eq!(active_task(&scheduler), replacement);
    assert_eq!(replacement.progress, 0);
    let recent = query::recent_entities(scheduler.world());
    assert!(recent.contains(&before.target));
    assert_eq!(recent.last(), Some(&replacement.target));
    let record = query::reroll_record(scheduler.world(), ANA);
    assert_eq!(record.used_today, 1);
    assert_eq!(record.last_reroll_at, Some(start()));
    assert!(host
        .whispers_to(ANA)
        .ends_with(&[
            "Task rerolled! 50000 points have been deducted.".to_owned(),
            "You have 9 rerolls remaining today.".to_owned(),
        ]));

    let early = start() + Duration::seconds(299);
    let error = scheduler.reroll(ANA, early).await.expect_err("cooldown");
    assert!(matches!(error, RerollError::Limited(_)));
    assert_eq!(economy.balance(ANA), 70_000);
    assert_eq!(
        host.whispers_to(ANA).last().map(String::as_str),
        Some("You must wait 1 more minutes before rerolling again.")
    );

    let _ = scheduler
        .reroll(ANA, start() + Duration::seconds(300))
        .await
        .expect("cooldown elapsed");
    assert_eq!(economy.balance(ANA), 20_000);
}

#[tokio::test]
async fn rerolled_targets_stay_in_recent_memory() {
    let economy = Arc::new(MemoryEconomy::with_balance(ANA, 1_000_000));
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), economy, host);
    let _ = scheduler.on_tick(start());
    let mut generated = vec![active_task(&scheduler).target];

    for round in 1..=4 {
        let at = start() + Duration::minutes(5 * round);
        let task = scheduler.reroll(ANA, at).await.expect("reroll");
        generated.push(task.target);
    }

    let mut distinct = generated.clone();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 5, "targets repeated: {generated:?}");
    assert_eq!(query::recent_entities(scheduler.world()), generated);
}

#[tokio::test]
async fn reroll_without_a_task_is_refused() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));

    let error = scheduler.reroll(ANA, start()).await.expect_err("no task");
    assert_eq!(error, RerollError::NoActiveTask);
    assert_eq!(
        host.whispers_to(ANA),
        vec!["There is no active task to reroll!".to_owned()]
    );
}

#[test]
fn daily_reset_clears_usage_and_is_announced() {
    let host = Arc::new(RecordingHost::default());
    let config = config();
    let mut scheduler = scheduler(&config, Arc::default(), Arc::clone(&host));
    let midnight = start() + Duration::hours(12);

    let _ = scheduler.on_tick(midnight - Duration::seconds(1));
    assert!(!host
        .broadcasts()
        .contains(&"Daily task reroll attempts have been reset!".to_owned()));

    let _ = scheduler.on_tick(midnight);
    assert!(host
        .broadcasts()
        .contains(&"Daily task reroll attempts have been reset!".to_owned()));
    assert_eq!(
        query::next_reroll_reset(scheduler.world()),
        midnight + Duration::days(1)
    );
}

#[tokio::test]
async fn players_cannot_run_admin_commands() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));

    let result = scheduler
        .handle_command(&Invoker::player(ANA, "ana"), &["admin", "setlevel", "9"], start())
        .await;

    assert_eq!(result, Err(CommandError::PermissionDenied));
    assert_eq!(query::level(scheduler.world()), 1);
    assert_eq!(
        host.whispers_to(ANA),
        vec!["You don't have permission to use admin commands!".to_owned()]
    );
}

#[tokio::test]
async fn admin_experience_runs_the_level_up_loop() {
    let host = Arc::new(RecordingHost::default());
    let mut config = config();
    config.progression = XpCurve::new(100, 2.0);
    let mut scheduler = scheduler(&config, Arc::default(), Arc::clone(&host));
    let admin = Invoker::admin(ANA, "ana");

    scheduler
        .handle_command(&admin, &["admin", "addxp", "650"], start())
        .await
        .expect("addxp");

    assert_eq!(query::level(scheduler.world()), 3);
    assert!(host
        .broadcasts()
        .ends_with(&["World has reached level 2!".to_owned(), "World has reached level 3!".to_owned()]));
    assert_eq!(
        host.whispers_to(ANA),
        vec!["Added 650 XP to world (Current: 50/800)".to_owned()]
    );

    scheduler
        .handle_command(&admin, &["admin", "updatexp"], start())
        .await
        .expect("updatexp");
    assert!(host
        .whispers_to(ANA)
        .ends_with(&["Level 4 requires: 1,600 XP".to_owned(), "Level 5 requires: 3,200 XP".to_owned(), "Level 6 requires: 6,400 XP".to_owned()]));
}

#[tokio::test]
async fn admin_new_task_replaces_the_active_task() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));
    let _ = scheduler.on_tick(start());
    let task = active_task(&scheduler);
    let _ = scheduler.on_kill(ANA, "ana", task.target, start());

    scheduler
        .handle_command(&Invoker::admin(ANA, "ana"), &["admin", "newtask"], start())
        .await
        .expect("newtask");

    assert_eq!(active_task(&scheduler).progress, 0);
    assert!(query::contributions(scheduler.world()).is_empty());
    assert_eq!(
        host.whispers_to(ANA).last().map(String::as_str),
        Some("Generating new task...")
    );
}

#[tokio::test]
async fn status_reports_the_ledger() {
    let host = Arc::new(RecordingHost {
        hardmode: true,
        ..RecordingHost::default()
    });
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));

    scheduler
        .handle_command(&Invoker::player(BO, "bo"), &[], start())
        .await
        .expect("status");

    assert_eq!(
        host.whispers_to(BO),
        vec![
            "World Status".to_owned(),
            "Level: 1".to_owned(),
            "XP: 0/38,912".to_owned(),
            "Progress: 0%".to_owned(),
            "Remaining: 38,912 XP".to_owned(),
            "State: Hardmode".to_owned(),
        ]
    );
}

#[test]
fn spawn_requests_follow_the_world_level() {
    let host = Arc::new(RecordingHost::default());
    let mut scheduler = scheduler(&config(), Arc::default(), Arc::clone(&host));
    let twins = SpawnRequest {
        slot: 4,
        entity: EntityId::new(126),
    };

    let decision = scheduler.on_spawn_request(ANA, 4, &twins.encode());
    assert!(!decision.is_allowed());
    assert_eq!(
        host.whispers_to(ANA),
        vec![
            "Cannot spawn TheTwins yet! Required world level: 7".to_owned(),
            "Current world level: 1".to_owned(),
        ]
    );

    let slime = SpawnRequest {
        slot: 4,
        entity: EntityId::new(50),
    };
    assert!(scheduler.on_spawn_request(ANA, 4, &slime.encode()).is_allowed());

    let forged = scheduler.on_spawn_request(BO, 5, &twins.encode());
    assert!(matches!(forged, SpawnDecision::Rejected { .. }));
    assert!(!forged.is_allowed());
}
