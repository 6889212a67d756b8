#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level-based permission check for boss summons.
//!
//! Every form of a multi-part encounter resolves to one canonical boss before
//! the level comparison, so cooperating forms are always allowed or denied
//! together. Bosses the catalog does not gate are denied.

use thiserror::Error;
use tracing::debug;
use world_level_catalog::Catalog;
use world_level_core::{Boss, EntityId};

/// Length of a well-formed spawn request payload.
pub const SPAWN_PACKET_LEN: usize = 4;

/// Spawn request decoded from the host's wire payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Player slot claimed by the packet.
    pub slot: i16,
    /// Entity type the player tries to summon.
    pub entity: EntityId,
}

/// Reasons a spawn payload is rejected before any level check.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPacketError {
    /// Fewer bytes than a slot and an entity type.
    #[error("spawn request too short: {len} bytes")]
    Truncated {
        /// Bytes received.
        len: usize,
    },
    /// The claimed slot does not belong to the sender.
    #[error("spawn request claims slot {claimed} but was sent by slot {sender}")]
    SenderMismatch {
        /// Slot written in the packet.
        claimed: i16,
        /// Slot of the connection that sent it.
        sender: i16,
    },
}

impl SpawnRequest {
    /// Decodes `slot: i16, entity: i16`, both little-endian.
    pub fn decode(payload: &[u8], sender_slot: i16) -> Result<Self, SpawnPacketError> {
        let &[s0, s1, e0, e1, ..] = payload else {
            return Err(SpawnPacketError::Truncated { len: payload.len() });
        };
        let slot = i16::from_le_bytes([s0, s1]);
        if slot != sender_slot {
            return Err(SpawnPacketError::SenderMismatch {
                claimed: slot,
                sender: sender_slot,
            });
        }
        let entity = i16::from_le_bytes([e0, e1]);
        Ok(Self {
            slot,
            entity: EntityId::new(i32::from(entity)),
        })
    }

    /// Encodes the request in the wire layout accepted by [`SpawnRequest::decode`].
    ///
    /// Entity ids outside the `i16` range are clamped.
    #[must_use]
    pub fn encode(&self) -> [u8; SPAWN_PACKET_LEN] {
        let entity = self.entity.get().clamp(i32::from(i16::MIN), i32::from(i16::MAX));
        let entity = i16::try_from(entity).unwrap_or_default();
        let [s0, s1] = self.slot.to_le_bytes();
        let [e0, e1] = entity.to_le_bytes();
        [s0, s1, e0, e1]
    }
}

/// Outcome of a spawn check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnDecision {
    /// The boss is unlocked.
    Allowed {
        /// Canonical boss.
        boss: Boss,
    },
    /// The world level is too low.
    Denied {
        /// Canonical boss.
        boss: Boss,
        /// Level the boss requires, if the catalog gates it.
        required: Option<u32>,
        /// Current world level.
        current: u32,
    },
    /// The entity is not a gated boss and may spawn.
    NotABoss {
        /// Entity requested.
        entity: EntityId,
    },
    /// The payload was malformed and the request is dropped.
    Rejected {
        /// Decoding failure.
        reason: SpawnPacketError,
    },
}

impl SpawnDecision {
    /// Reports whether the host should let the spawn proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(
            self,
            SpawnDecision::Allowed { .. } | SpawnDecision::NotABoss { .. }
        )
    }

    /// Lines sent privately to the requesting player.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            SpawnDecision::Denied {
                boss,
                required,
                current,
            } => vec![
                format!(
                    "Cannot spawn {boss} yet! Required world level: {}",
                    required.unwrap_or_default()
                ),
                format!("Current world level: {current}"),
            ],
            _ => Vec::new(),
        }
    }
}

/// Boss gate backed by the catalog's unlock table.
#[derive(Clone, Copy, Debug)]
pub struct BossGate<'a> {
    catalog: &'a Catalog,
}

impl<'a> BossGate<'a> {
    /// Creates a gate reading unlock levels from `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Reports whether `boss` may spawn at `level`. Ungated bosses never may.
    #[must_use]
    pub fn can_spawn(&self, boss: Boss, level: u32) -> bool {
        if boss == Boss::Unknown {
            return false;
        }
        self.catalog
            .required_level(boss)
            .is_some_and(|required| level >= required)
    }

    /// Canonical boss for any form of an encounter.
    #[must_use]
    pub fn resolve(&self, entity: EntityId) -> Option<Boss> {
        self.catalog.resolve_boss(entity)
    }

    /// Decides a spawn attempt for an entity type.
    #[must_use]
    pub fn decide(&self, entity: EntityId, level: u32) -> SpawnDecision {
        let Some(boss) = self.resolve(entity) else {
            debug!(%entity, "spawn request is not a gated boss");
            return SpawnDecision::NotABoss { entity };
        };

        if self.can_spawn(boss, level) {
            debug!(%boss, level, "boss spawn allowed");
            SpawnDecision::Allowed { boss }
        } else {
            debug!(%boss, level, "boss spawn denied");
            SpawnDecision::Denied {
                boss,
                required: self.catalog.required_level(boss),
                current: level,
            }
        }
    }

    /// Decodes a wire payload and decides it. Malformed payloads are rejected.
    #[must_use]
    pub fn decide_packet(&self, payload: &[u8], sender_slot: i16, level: u32) -> SpawnDecision {
        match SpawnRequest::decode(payload, sender_slot) {
            Ok(request) => self.decide(request.entity, level),
            Err(reason) => {
                debug!(%reason, "spawn request rejected");
                SpawnDecision::Rejected { reason }
            }
        }
    }
}
