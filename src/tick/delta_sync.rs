use crate::state::session::Session;
use crate::utils::buffers::{SmallEventVec, SyncEvent};

/// Collect field deltas for delta-based state sync.
/// Every character is compared against its last synced values, so any
/// mutation on the authority replicates no matter which path made it.
pub fn collect_state_events(session: &mut Session) -> SmallEventVec {
    let mut events = SmallEventVec::new();

    for (&character_id, character) in &session.characters {
        let current = character.to_sync_state();
        let last = session.last_sync_state.get(&character_id);

        if last.map(|l| l.weapon != current.weapon).unwrap_or(true) {
            events.push(SyncEvent::WeaponChanged {
                character_id,
                weapon: current.weapon,
            });
        }

        if last.map(|l| l.health != current.health).unwrap_or(true) {
            events.push(SyncEvent::HealthChanged {
                character_id,
                health: current.health,
            });
        }

        if last.map(|l| l.pistol_ammo != current.pistol_ammo).unwrap_or(true) {
            events.push(SyncEvent::PistolAmmoChanged {
                character_id,
                pistol_ammo: current.pistol_ammo,
            });
        }

        if last.map(|l| l.rifle_ammo != current.rifle_ammo).unwrap_or(true) {
            events.push(SyncEvent::RifleAmmoChanged {
                character_id,
                rifle_ammo: current.rifle_ammo,
            });
        }

        // The lock only ever goes one way
        let was_locked = last.map(|l| l.movement_locked).unwrap_or(false);
        if current.movement_locked && !was_locked {
            events.push(SyncEvent::MovementLocked { character_id });
        }

        session.last_sync_state.insert(character_id, current);
    }

    events
}

/// Collect position updates for characters (separate from state sync)
pub fn collect_position_events(session: &Session, character_ids: &[u32]) -> SmallEventVec {
    let mut events = SmallEventVec::new();

    for &character_id in character_ids {
        if let Some(character) = session.characters.get(&character_id) {
            events.push(SyncEvent::PositionChanged {
                character_id,
                position: character.position,
                rotation: character.rotation,
            });
        }
    }

    events
}
