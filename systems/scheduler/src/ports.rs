//! Collaborators the scheduler talks to.

use async_trait::async_trait;
use world_level_core::{ActorId, EntityId};

/// Currency backend consulted for reroll fees and task payouts.
#[async_trait]
pub trait Economy: Send + Sync {
    /// Adds `delta` to the actor's balance; negative values charge the actor.
    ///
    /// Returns `false` when the adjustment was refused, for example when the
    /// actor cannot afford a charge. A refused adjustment changes nothing.
    async fn adjust_balance(&self, actor: ActorId, delta: i64) -> bool;
}

/// Game runtime hosting the session.
pub trait Host: Send + Sync {
    /// Whether the world has entered hardmode.
    fn is_hardmode_active(&self) -> bool;

    /// Sends a message to every connected player.
    fn broadcast(&self, message: &str);

    /// Sends a message to one player.
    fn whisper(&self, actor: ActorId, message: &str);

    /// Display name of an entity type.
    fn entity_name(&self, entity: EntityId) -> String {
        format!("NPC {entity}")
    }
}
