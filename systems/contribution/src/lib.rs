#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-actor kill accounting for the active task and proportional payouts.

use std::collections::BTreeMap;

use world_level_core::ActorId;

/// Kills one actor contributed to the active task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContributionRecord {
    /// Account credited with the kills.
    pub actor: ActorId,
    /// Name last reported for the actor.
    pub display_name: String,
    /// Valid kills counted for the actor.
    pub kills: u32,
}

/// Portion of a reward pool owed to one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Share {
    /// Account receiving the payout.
    pub actor: ActorId,
    /// Name shown when announcing the payout.
    pub display_name: String,
    /// Kills the share is based on.
    pub kills: u32,
    /// Fraction of all kills, expressed in percent.
    pub share_percent: f64,
    /// Amount paid, rounded down.
    pub amount: u64,
}

/// Lazily populated contribution table scoped to the active task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContributionTracker {
    records: BTreeMap<ActorId, ContributionRecord>,
}

impl ContributionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one kill for the actor and returns the actor's new total.
    pub fn record_kill(&mut self, actor: ActorId, display_name: &str) -> u32 {
        let record = self
            .records
            .entry(actor)
            .or_insert_with(|| ContributionRecord {
                actor,
                display_name: display_name.to_owned(),
                kills: 0,
            });
        if record.display_name != display_name {
            record.display_name = display_name.to_owned();
        }
        record.kills = record.kills.saturating_add(1);
        record.kills
    }

    /// Kills counted for the actor so far.
    #[must_use]
    pub fn kills(&self, actor: ActorId) -> u32 {
        self.records.get(&actor).map_or(0, |record| record.kills)
    }

    /// Sum of every actor's kills.
    #[must_use]
    pub fn total_kills(&self) -> u64 {
        self.records
            .values()
            .map(|record| u64::from(record.kills))
            .sum()
    }

    /// Records ordered by actor id.
    pub fn records(&self) -> impl Iterator<Item = &ContributionRecord> {
        self.records.values()
    }

    /// Reports whether no kill was counted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Actor with the most kills; ties go to the lowest actor id.
    #[must_use]
    pub fn top_contributor(&self) -> Option<&ContributionRecord> {
        self.records
            .values()
            .filter(|record| record.kills > 0)
            .fold(None, |best: Option<&ContributionRecord>, record| match best {
                Some(current) if current.kills >= record.kills => Some(current),
                _ => Some(record),
            })
    }

    /// Splits `total` in proportion to kills.
    ///
    /// Every amount is rounded down and the remainder is not redistributed,
    /// so the amounts never sum to more than `total`. Actors without kills
    /// receive nothing and are left out.
    #[must_use]
    pub fn compute_shares(&self, total: u64) -> Vec<Share> {
        let total_kills = self.total_kills();
        if total_kills == 0 {
            return Vec::new();
        }

        self.records
            .values()
            .filter(|record| record.kills > 0)
            .map(|record| {
                let kills = u128::from(record.kills);
                let amount = u128::from(total) * kills / u128::from(total_kills);
                Share {
                    actor: record.actor,
                    display_name: record.display_name.clone(),
                    kills: record.kills,
                    share_percent: f64::from(record.kills) * 100.0 / total_kills as f64,
                    amount: u64::try_from(amount).unwrap_or(total),
                }
            })
            .collect()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_kill_creates_the_record() {
        let mut tracker = ContributionTracker::new();
        assert!(tracker.is_empty());
        assert_eq!(tracker.record_kill(ActorId::new(4), "ana"), 1);
        assert_eq!(tracker.record_kill(ActorId::new(4), "ana"), 2);
        assert_eq!(tracker.kills(ActorId::new(4)), 2);
        assert_eq!(tracker.kills(ActorId::new(5)), 0);
    }

    #[test]
    fn latest_display_name_is_kept() {
        let mut tracker = ContributionTracker::new();
        let _ = tracker.record_kill(ActorId::new(4), "ana");
        let _ = tracker.record_kill(ActorId::new(4), "Ana");
        let names: Vec<_> = tracker.records().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ana"]);
    }

    #[test]
    fn top_contributor_ties_go_to_lowest_id() {
        let mut tracker = ContributionTracker::new();
        let _ = tracker.record_kill(ActorId::new(9), "late");
        let _ = tracker.record_kill(ActorId::new(2), "early");
        let top = tracker.top_contributor().expect("top contributor");
        assert_eq!(top.actor, ActorId::new(2));

        let _ = tracker.record_kill(ActorId::new(9), "late");
        let top = tracker.top_contributor().expect("top contributor");
        assert_eq!(top.actor, ActorId::new(9));
    }

    #[test]
    fn empty_tracker_pays_nothing() {
        let tracker = ContributionTracker::new();
        assert!(tracker.compute_shares(1_000).is_empty());
        assert!(tracker.top_contributor().is_none());
    }
}
