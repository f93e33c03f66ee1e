//! Observer side of replication: mirrors take values pushed by the
//! authority and fire presentation hooks when a hooked field changes.
//!
//! Only `weapon` and `health` have hooks. Ammo and the movement lock are
//! mirrored silently.

use crate::error::DispatchError;
use crate::state::character::{Character, CharacterSnapshot};
use crate::utils::buffers::SyncEvent;

/// Presentation-layer reactions to replicated changes
pub trait PresentationHooks {
    fn on_weapon_changed(&mut self, _character_id: u32, _weapon: i32) {}

    fn on_health_changed(&mut self, _character_id: u32, _health: i32) {}
}

/// Hooks that do nothing, for headless observers
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl PresentationHooks for NoHooks {}

/// Build an observer mirror from a full snapshot. The initial weapon and
/// health count as changes, so both hooks fire once.
pub fn mirror_from_snapshot<H: PresentationHooks + ?Sized>(
    snapshot: CharacterSnapshot,
    hooks: &mut H,
) -> Character {
    let mut mirror = Character::observer(snapshot.id, snapshot.name, snapshot.state);
    mirror.position = snapshot.position;
    mirror.rotation = snapshot.rotation;

    hooks.on_weapon_changed(mirror.id, mirror.state.weapon);
    hooks.on_health_changed(mirror.id, mirror.state.health);
    mirror
}

/// Overwrite an existing mirror with a snapshot, firing hooks only for
/// fields whose value differs.
pub fn refresh_from_snapshot<H: PresentationHooks + ?Sized>(
    mirror: &mut Character,
    snapshot: CharacterSnapshot,
    hooks: &mut H,
) -> Result<(), DispatchError> {
    ensure_observer(mirror)?;

    let events = [
        SyncEvent::WeaponChanged { character_id: mirror.id, weapon: snapshot.state.weapon },
        SyncEvent::HealthChanged { character_id: mirror.id, health: snapshot.state.health },
        SyncEvent::PistolAmmoChanged { character_id: mirror.id, pistol_ammo: snapshot.state.pistol_ammo },
        SyncEvent::RifleAmmoChanged { character_id: mirror.id, rifle_ammo: snapshot.state.rifle_ammo },
    ];
    for event in events {
        apply_sync_event(mirror, &event, hooks)?;
    }

    mirror.state.movement_locked = snapshot.state.movement_locked;
    mirror.position = snapshot.position;
    mirror.rotation = snapshot.rotation;
    Ok(())
}

/// Apply one replicated field change to an observer mirror.
///
/// Values that match the mirror are dropped without firing hooks, so
/// coalesced or repeated updates never double-notify.
pub fn apply_sync_event<H: PresentationHooks + ?Sized>(
    mirror: &mut Character,
    event: &SyncEvent,
    hooks: &mut H,
) -> Result<(), DispatchError> {
    ensure_observer(mirror)?;

    let state = &mut mirror.state;
    match *event {
        SyncEvent::WeaponChanged { weapon, .. } => {
            if state.weapon != weapon {
                state.weapon = weapon;
                hooks.on_weapon_changed(mirror.id, weapon);
            }
        }
        SyncEvent::HealthChanged { health, .. } => {
            if state.health != health {
                state.health = health;
                hooks.on_health_changed(mirror.id, health);
            }
        }
        SyncEvent::PistolAmmoChanged { pistol_ammo, .. } => state.pistol_ammo = pistol_ammo,
        SyncEvent::RifleAmmoChanged { rifle_ammo, .. } => state.rifle_ammo = rifle_ammo,
        SyncEvent::MovementLocked { .. } => state.movement_locked = true,
        SyncEvent::PositionChanged { position, rotation, .. } => {
            mirror.position = position;
            mirror.rotation = rotation;
        }
    }
    Ok(())
}

fn ensure_observer(mirror: &Character) -> Result<(), DispatchError> {
    if mirror.is_authority() {
        Err(DispatchError::NotObserver { character_id: mirror.id })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::character::CharacterState;

    #[derive(Default)]
    struct Recorder {
        weapons: Vec<(u32, i32)>,
        health: Vec<(u32, i32)>,
    }

    impl PresentationHooks for Recorder {
        fn on_weapon_changed(&mut self, character_id: u32, weapon: i32) {
            self.weapons.push((character_id, weapon));
        }

        fn on_health_changed(&mut self, character_id: u32, health: i32) {
            self.health.push((character_id, health));
        }
    }

    fn snapshot(weapon: i32) -> CharacterSnapshot {
        CharacterSnapshot {
            id: 5,
            name: "Mirror".to_string(),
            state: CharacterState { weapon, ..CharacterState::default() },
            position: (1.0, 2.0, 3.0),
            rotation: (0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_first_snapshot_fires_hooks() {
        let mut hooks = Recorder::default();
        let mirror = mirror_from_snapshot(snapshot(2), &mut hooks);

        assert!(!mirror.is_authority());
        assert_eq!(mirror.position, (1.0, 2.0, 3.0));
        assert_eq!(hooks.weapons, vec![(5, 2)]);
        assert_eq!(hooks.health, vec![(5, 100)]);
    }

    #[test]
    fn test_weapon_change_fires_once() {
        let mut hooks = Recorder::default();
        let mut mirror = mirror_from_snapshot(snapshot(0), &mut hooks);
        hooks.weapons.clear();

        let event = SyncEvent::WeaponChanged { character_id: 5, weapon: 1 };
        apply_sync_event(&mut mirror, &event, &mut hooks).unwrap();
        apply_sync_event(&mut mirror, &event, &mut hooks).unwrap();

        assert_eq!(mirror.state().weapon, 1);
        assert_eq!(hooks.weapons, vec![(5, 1)]);
    }

    #[test]
    fn test_ammo_is_mirrored_without_hooks() {
        let mut hooks = Recorder::default();
        let mut mirror = mirror_from_snapshot(snapshot(1), &mut hooks);
        hooks = Recorder::default();

        apply_sync_event(&mut mirror, &SyncEvent::PistolAmmoChanged { character_id: 5, pistol_ammo: 42 }, &mut hooks).unwrap();
        apply_sync_event(&mut mirror, &SyncEvent::RifleAmmoChanged { character_id: 5, rifle_ammo: 7 }, &mut hooks).unwrap();
        apply_sync_event(&mut mirror, &SyncEvent::MovementLocked { character_id: 5 }, &mut hooks).unwrap();

        assert_eq!(mirror.state().pistol_ammo, 42);
        assert_eq!(mirror.state().rifle_ammo, 7);
        assert!(mirror.state().movement_locked);
        assert!(hooks.weapons.is_empty());
        assert!(hooks.health.is_empty());
    }

    #[test]
    fn test_health_hook() {
        let mut hooks = Recorder::default();
        let mut mirror = mirror_from_snapshot(snapshot(0), &mut hooks);

        apply_sync_event(&mut mirror, &SyncEvent::HealthChanged { character_id: 5, health: -50 }, &mut hooks).unwrap();
        assert_eq!(hooks.health, vec![(5, 100), (5, -50)]);
    }

    #[test]
    fn test_authority_rejects_replicated_values() {
        let mut character = Character::authority(5, "Auth".to_string(), CharacterState::default());
        let result = apply_sync_event(
            &mut character,
            &SyncEvent::WeaponChanged { character_id: 5, weapon: 2 },
            &mut NoHooks,
        );
        assert_eq!(result, Err(DispatchError::NotObserver { character_id: 5 }));
        assert_eq!(character.state().weapon, 0);
    }

    #[test]
    fn test_refresh_only_fires_on_difference() {
        let mut hooks = Recorder::default();
        let mut mirror = mirror_from_snapshot(snapshot(1), &mut hooks);
        hooks = Recorder::default();

        refresh_from_snapshot(&mut mirror, snapshot(1), &mut hooks).unwrap();
        assert!(hooks.weapons.is_empty());

        refresh_from_snapshot(&mut mirror, snapshot(2), &mut hooks).unwrap();
        assert_eq!(hooks.weapons, vec![(5, 2)]);
        assert!(hooks.health.is_empty());
    }
}
