use bevy_ecs::message::Message;
use bevy_ecs::prelude::Entity;

/// A damager hit a damageable and the target accepted the damage.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    pub damager: Entity,
    pub target: Entity,
    pub amount: i32,
    /// Target health ran out with this hit.
    pub lethal: bool,
}
