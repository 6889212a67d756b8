#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host simulator that drives the world level engine from a
//! script or standard input.

mod console;
mod script;

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use world_level_catalog::Catalog;
use world_level_core::ActorId;
use world_level_storage::{load_config, StateStore};
use world_level_system_boss_gate::SpawnRequest;
use world_level_system_scheduler::{Economy, Host, Invoker, PendingPayout, Scheduler};

use console::{ConsoleHost, MemoryEconomy};
use script::{parse_line, SessionCommand};

const MAX_WAIT_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Simulates a game host feeding ticks, kills, spawn requests, and player
/// commands to the world level engine.
#[derive(Debug, Parser)]
#[command(name = "world-level", version)]
struct Args {
    /// World state file, created on first save.
    #[arg(long, default_value = "world-level.json")]
    state: PathBuf,
    /// Engine configuration; defaults apply when the file is missing.
    #[arg(long, default_value = "world-level.toml")]
    config: PathBuf,
    /// Reads commands from this file instead of standard input.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Reports hardmode as active.
    #[arg(long)]
    hardmode: bool,
    /// Actor ids allowed to run admin commands.
    #[arg(long = "admin")]
    admins: Vec<u32>,
    /// Balance every actor starts with.
    #[arg(long, default_value_t = 100_000)]
    starting_balance: i64,
}

struct Session {
    scheduler: Scheduler,
    store: StateStore,
    economy: Arc<MemoryEconomy>,
    admins: BTreeSet<ActorId>,
    clock_offset: Duration,
}

impl Session {
    fn now(&self) -> DateTime<Utc> {
        Utc::now() + self.clock_offset
    }

    /// Runs one command. Returns `false` once the session should end.
    async fn run(&mut self, command: SessionCommand) -> bool {
        let now = self.now();
        match command {
            SessionCommand::Tick => {
                let payout = self.scheduler.on_tick(now);
                self.settle(payout).await;
            }
            SessionCommand::Wait { seconds } => {
                let seconds = seconds.clamp(-MAX_WAIT_SECS, MAX_WAIT_SECS);
                self.clock_offset = self.clock_offset + Duration::seconds(seconds);
                info!(seconds, "clock advanced");
            }
            SessionCommand::Kill {
                actor,
                name,
                entity,
            } => {
                let payout = self.scheduler.on_kill(actor, &name, entity, now);
                self.settle(payout).await;
            }
            SessionCommand::Spawn {
                actor,
                slot,
                entity,
            } => {
                let payload = SpawnRequest { slot, entity }.encode();
                let decision = self.scheduler.on_spawn_request(actor, slot, &payload);
                let verdict = if decision.is_allowed() {
                    "allowed"
                } else {
                    "denied"
                };
                println!("spawn of {entity} by {actor}: {verdict}");
            }
            SessionCommand::WorldLevel { actor, name, args } => {
                let invoker = Invoker {
                    actor,
                    name,
                    is_admin: self.admins.contains(&actor),
                };
                let words: Vec<&str> = args.iter().map(String::as_str).collect();
                if let Err(error) = self.scheduler.handle_command(&invoker, &words, now).await {
                    info!(%actor, %error, "command refused");
                }
            }
            SessionCommand::Balance { actor } => {
                println!("balance of {actor}: {}", self.economy.balance(actor).await);
            }
            SessionCommand::Quit => return false,
        }
        self.persist();
        true
    }

    async fn settle(&self, payout: Option<PendingPayout>) {
        let Some(payout) = payout else {
            return;
        };
        let report = payout.settle().await;
        for share in &report.failed {
            warn!(actor = %share.actor, amount = share.amount, "payout was not delivered");
        }
        info!(paid = report.total_paid(), "task rewards settled");
    }

    fn persist(&mut self) {
        if !self.scheduler.take_dirty() {
            return;
        }
        if let Err(error) = self.store.save(&self.scheduler.snapshot()) {
            error!(%error, "failed to save world, keeping in-memory state");
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("world_level=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

async fn run_lines<R>(session: &mut Session, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut number = 0_usize;
    while let Some(line) = lines.next_line().await.context("failed to read command")? {
        number += 1;
        match parse_line(&line) {
            Ok(Some(command)) => {
                if !session.run(command).await {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => warn!(line = number, "{error:#}"),
        }
    }
    Ok(())
}

async fn open_script(path: &Path) -> Result<BufReader<tokio::fs::File>> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open script at {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Entry point for the world level host simulator.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = load_config(&args.config)?;
    let store = StateStore::new(&args.state);
    let world = store.load_or_init(&config, Utc::now());
    let economy = Arc::new(MemoryEconomy::new(args.starting_balance));
    let bank: Arc<dyn Economy> = economy.clone();
    let host: Arc<dyn Host> = Arc::new(ConsoleHost::new(args.hardmode));
    let scheduler = Scheduler::new(world, Catalog::standard(), &config, bank, host);

    let mut session = Session {
        scheduler,
        store,
        economy,
        admins: args.admins.into_iter().map(ActorId::new).collect(),
        clock_offset: Duration::zero(),
    };
    info!(state = %args.state.display(), "world level session started");

    match &args.script {
        Some(path) => run_lines(&mut session, open_script(path).await?).await?,
        None => run_lines(&mut session, BufReader::new(tokio::io::stdin())).await?,
    }

    if let Err(error) = session.store.save(&session.scheduler.snapshot()) {
        error!(%error, "failed to save world on exit");
    }
    Ok(())
}
