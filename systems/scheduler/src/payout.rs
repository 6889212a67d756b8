//! Deferred reward distribution.

use std::{fmt, sync::Arc};

use tokio::sync::Mutex;
use tracing::{info, warn};
use world_level_system_contribution::Share;

use crate::{
    narration,
    ports::{Economy, Host},
};

/// Reward distribution produced by a task completion.
///
/// Nothing is paid until [`PendingPayout::settle`] is awaited. Settling takes
/// the economy lock shared with reroll fees, so no two balance updates issued
/// by the scheduler interleave.
#[must_use = "rewards are only paid once the payout is settled"]
pub struct PendingPayout {
    economy: Arc<dyn Economy>,
    host: Arc<dyn Host>,
    lock: Arc<Mutex<()>>,
    currency: String,
    shares: Vec<Share>,
}

impl PendingPayout {
    pub(crate) fn new(
        economy: Arc<dyn Economy>,
        host: Arc<dyn Host>,
        lock: Arc<Mutex<()>>,
        currency: String,
        shares: Vec<Share>,
    ) -> Self {
        Self {
            economy,
            host,
            lock,
            currency,
            shares,
        }
    }

    /// Shares that will be paid.
    #[must_use]
    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    /// Pays every share and reports which adjustments the economy refused.
    pub async fn settle(self) -> PayoutReport {
        let _guard = self.lock.lock().await;
        let mut report = PayoutReport::default();

        for share in self.shares {
            if share.amount == 0 {
                continue;
            }
            let delta = i64::try_from(share.amount).unwrap_or(i64::MAX);
            if self.economy.adjust_balance(share.actor, delta).await {
                info!(actor = %share.actor, amount = share.amount, "task reward paid");
                self.host.whisper(
                    share.actor,
                    &narration::payout_received(&share, &self.currency),
                );
                report.paid.push(share);
            } else {
                warn!(actor = %share.actor, amount = share.amount, "task reward refused by economy");
                report.failed.push(share);
            }
        }

        report
    }
}

impl fmt::Debug for PendingPayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPayout")
            .field("currency", &self.currency)
            .field("shares", &self.shares)
            .finish_non_exhaustive()
    }
}

/// Outcome of a settled payout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PayoutReport {
    /// Shares the economy accepted.
    pub paid: Vec<Share>,
    /// Shares the economy refused.
    pub failed: Vec<Share>,
}

impl PayoutReport {
    /// Total amount credited.
    #[must_use]
    pub fn total_paid(&self) -> u64 {
        self.paid.iter().map(|share| share.amount).sum()
    }
}
