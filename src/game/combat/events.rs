// Combat events, queued during a tick and drained by interested consumers

use crate::game::characters::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    DamageTaken {
        entity: EntityId,
        source: Option<EntityId>,
        amount: f32,
        current: f32,
    },
    HealthRestored {
        entity: EntityId,
        amount: f32,
        current: f32,
    },
    /// Fired exactly once per entity
    Died {
        entity: EntityId,
        killer: Option<EntityId>,
    },
    WeaponEquipped {
        entity: EntityId,
        weapon: String,
    },
    WeaponUnequipped {
        entity: EntityId,
        weapon: String,
    },
    KillScored {
        victim: EntityId,
        killer: Option<EntityId>,
        total_kills: u32,
    },
    /// A dead player came back as an enemy
    Reanimated {
        player: EntityId,
        enemy: EntityId,
    },
}

/// FIFO of events produced during the current tick
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<CombatEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
