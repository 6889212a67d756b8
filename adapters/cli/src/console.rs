//! Console stand-ins for the game runtime and the bank.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;
use world_level_core::ActorId;
use world_level_system_scheduler::{Economy, Host};

/// Prints every message to standard output.
#[derive(Debug)]
pub(crate) struct ConsoleHost {
    hardmode: bool,
}

impl ConsoleHost {
    pub(crate) fn new(hardmode: bool) -> Self {
        Self { hardmode }
    }
}

impl Host for ConsoleHost {
    fn is_hardmode_active(&self) -> bool {
        self.hardmode
    }

    fn broadcast(&self, message: &str) {
        println!("[all] {message}");
    }

    fn whisper(&self, actor: ActorId, message: &str) {
        println!("[to {actor}] {message}");
    }
}

/// Balances kept in memory; every actor starts with the same amount.
#[derive(Debug)]
pub(crate) struct MemoryEconomy {
    starting_balance: i64,
    balances: Mutex<BTreeMap<ActorId, i64>>,
}

impl MemoryEconomy {
    pub(crate) fn new(starting_balance: i64) -> Self {
        Self {
            starting_balance,
            balances: Mutex::new(BTreeMap::new()),
        }
    }

    pub(crate) async fn balance(&self, actor: ActorId) -> i64 {
        self.balances
            .lock()
            .await
            .get(&actor)
            .copied()
            .unwrap_or(self.starting_balance)
    }
}

#[async_trait]
impl Economy for MemoryEconomy {
    async fn adjust_balance(&self, actor: ActorId, delta: i64) -> bool {
        let mut balances = self.balances.lock().await;
        let balance = balances.entry(actor).or_insert(self.starting_balance);
        match balance.checked_add(delta) {
            Some(next) if next >= 0 => {
                debug!(%actor, delta, balance = next, "balance adjusted");
                *balance = next;
                true
            }
            _ => {
                debug!(%actor, delta, balance = *balance, "balance adjustment refused");
                false
            }
        }
    }
}
