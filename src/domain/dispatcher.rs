//! Authority-gated action dispatch.
//!
//! Player intents enter through `request_switch_weapon` / `request_fire`. On
//! the authority they are applied in place; anywhere else they are forwarded
//! through an [`AuthorityLink`] and the local mirror is left untouched until
//! the authority replicates the result back.

use crate::error::DispatchError;
use crate::state::character::{Character, CharacterState, Role};
use crate::utils::weapons::Weapon;

/// Action forwarded from a non-authoritative process to the authority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedAction {
    SwitchWeapon(i32),
    Fire,
}

/// Fire-and-forget channel from an observer to the authority.
///
/// Implementations stamp each request with an increasing sequence number
/// and swallow (log) send failures; callers never wait for an answer.
pub trait AuthorityLink {
    fn send(&self, character_id: u32, action: RequestedAction);
}

/// How a request was handled on the calling process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    Forwarded,
}

/// Result of the authority's request validators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    Rejected(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// One round consumed, `remaining` left in the equipped weapon's pool
    Fired { weapon: Weapon, remaining: i32 },
    OutOfAmmo,
    /// Unarmed or an index with no weapon behind it
    NoWeapon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    Wounded,
    /// Health crossed to zero or below on this hit; movement is now locked
    Incapacitated,
    AlreadyIncapacitated,
}

/// Caller-side entry point for switching weapons.
pub fn request_switch_weapon<L: AuthorityLink + ?Sized>(
    character: &mut Character,
    link: &L,
    index: i32,
) -> Dispatch {
    match character.role() {
        Role::Authority => {
            handle_weapon_switch(&mut character.state, index);
            Dispatch::Applied
        }
        Role::Observer => {
            log::debug!("Forwarding weapon switch {} for character {}", index, character.id);
            link.send(character.id, RequestedAction::SwitchWeapon(index));
            Dispatch::Forwarded
        }
    }
}

/// Caller-side entry point for firing.
pub fn request_fire<L: AuthorityLink + ?Sized>(character: &mut Character, link: &L) -> Dispatch {
    match character.role() {
        Role::Authority => {
            handle_fire(&mut character.state);
            Dispatch::Applied
        }
        Role::Observer => {
            log::debug!("Forwarding fire for character {}", character.id);
            link.send(character.id, RequestedAction::Fire);
            Dispatch::Forwarded
        }
    }
}

/// Stop-fire hook. Firing is single-shot, so releasing the trigger does nothing.
pub fn release_fire(_character: &mut Character) {}

/// Every index is accepted.
pub fn validate_switch_weapon(_index: i32) -> Validation {
    Validation::Accepted
}

pub fn validate_fire() -> Validation {
    Validation::Accepted
}

/// Authority-only: store `index` as the equipped weapon, unvalidated.
pub fn apply_weapon_switch(character: &mut Character, index: i32) -> Result<(), DispatchError> {
    ensure_authority(character)?;
    handle_weapon_switch(&mut character.state, index);
    Ok(())
}

/// Authority-only: consume one round of the equipped weapon if any is left.
pub fn apply_fire(character: &mut Character) -> Result<FireOutcome, DispatchError> {
    ensure_authority(character)?;
    Ok(handle_fire(&mut character.state))
}

/// Authority-only: subtract `amount` from health. No floor is applied.
pub fn take_damage(character: &mut Character, amount: i32) -> Result<DamageOutcome, DispatchError> {
    ensure_authority(character)?;

    let state = &mut character.state;
    state.health = state.health.saturating_sub(amount);

    if !state.is_incapacitated() {
        return Ok(DamageOutcome::Wounded);
    }

    if state.movement_locked {
        return Ok(DamageOutcome::AlreadyIncapacitated);
    }

    state.movement_locked = true;
    log::info!("Character {} incapacitated (health {})", character.id, state.health);
    Ok(DamageOutcome::Incapacitated)
}

fn ensure_authority(character: &Character) -> Result<(), DispatchError> {
    if character.is_authority() {
        Ok(())
    } else {
        Err(DispatchError::NotAuthority { character_id: character.id })
    }
}

fn handle_weapon_switch(state: &mut CharacterState, index: i32) {
    state.weapon = index;
}

fn handle_fire(state: &mut CharacterState) -> FireOutcome {
    let (weapon, ammo) = match Weapon::from_index(state.weapon) {
        Some(Weapon::Pistol) => (Weapon::Pistol, &mut state.pistol_ammo),
        Some(Weapon::Rifle) => (Weapon::Rifle, &mut state.rifle_ammo),
        Some(Weapon::Unarmed) | None => return FireOutcome::NoWeapon,
    };

    if *ammo <= 0 {
        return FireOutcome::OutOfAmmo;
    }

    *ammo -= 1;
    FireOutcome::Fired { weapon, remaining: *ammo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingLink {
        sent: RefCell<Vec<(u32, RequestedAction)>>,
    }

    impl AuthorityLink for RecordingLink {
        fn send(&self, character_id: u32, action: RequestedAction) {
            self.sent.borrow_mut().push((character_id, action));
        }
    }

    fn authority() -> Character {
        Character::authority(1, "Auth".to_string(), CharacterState::default())
    }

    fn observer() -> Character {
        Character::observer(1, "Obs".to_string(), CharacterState::default())
    }

    #[test]
    fn test_switch_on_authority_applies() {
        let link = RecordingLink::default();
        for index in [0, 1, 2] {
            let mut character = authority();
            assert_eq!(request_switch_weapon(&mut character, &link, index), Dispatch::Applied);
            assert_eq!(character.state().weapon, index);
        }
        assert!(link.sent.borrow().is_empty());
    }

    #[test]
    fn test_switch_on_observer_forwards() {
        let link = RecordingLink::default();
        let mut character = observer();

        assert_eq!(request_switch_weapon(&mut character, &link, 2), Dispatch::Forwarded);
        assert_eq!(request_fire(&mut character, &link), Dispatch::Forwarded);

        // Local mirror untouched
        assert_eq!(character.state(), &CharacterState::default());
        assert_eq!(
            *link.sent.borrow(),
            vec![(1, RequestedAction::SwitchWeapon(2)), (1, RequestedAction::Fire)]
        );
    }

    #[test]
    fn test_apply_requires_authority() {
        let mut character = observer();
        assert_eq!(
            apply_weapon_switch(&mut character, 1),
            Err(DispatchError::NotAuthority { character_id: 1 })
        );
        assert!(apply_fire(&mut character).is_err());
        assert!(take_damage(&mut character, 10).is_err());
        assert_eq!(character.state(), &CharacterState::default());
    }

    #[test]
    fn test_out_of_range_index_is_stored() {
        let mut character = authority();
        apply_weapon_switch(&mut character, 7).unwrap();
        assert_eq!(character.state().weapon, 7);

        assert_eq!(apply_fire(&mut character), Ok(FireOutcome::NoWeapon));
        assert_eq!(character.state().pistol_ammo, 100);
        assert_eq!(character.state().rifle_ammo, 100);

        apply_weapon_switch(&mut character, -3).unwrap();
        assert_eq!(apply_fire(&mut character), Ok(FireOutcome::NoWeapon));
    }

    #[test]
    fn test_pistol_ammo_floor() {
        let mut character = authority();
        apply_weapon_switch(&mut character, 1).unwrap();

        for _ in 0..100 {
            assert!(matches!(apply_fire(&mut character), Ok(FireOutcome::Fired { .. })));
        }
        assert_eq!(character.state().pistol_ammo, 0);

        assert_eq!(apply_fire(&mut character), Ok(FireOutcome::OutOfAmmo));
        assert_eq!(character.state().pistol_ammo, 0);
        assert_eq!(character.state().rifle_ammo, 100);
    }

    #[test]
    fn test_rifle_fire_uses_rifle_pool() {
        let mut character = authority();
        apply_weapon_switch(&mut character, 2).unwrap();

        assert_eq!(
            apply_fire(&mut character),
            Ok(FireOutcome::Fired { weapon: Weapon::Rifle, remaining: 99 })
        );
        assert_eq!(character.state().pistol_ammo, 100);
    }

    #[test]
    fn test_unarmed_fire_is_noop() {
        let mut character = authority();
        let link = RecordingLink::default();
        for _ in 0..10 {
            request_fire(&mut character, &link);
        }
        assert_eq!(character.state().pistol_ammo, 100);
        assert_eq!(character.state().rifle_ammo, 100);
    }

    #[test]
    fn test_damage_past_zero() {
        let mut character = authority();

        assert_eq!(take_damage(&mut character, 150), Ok(DamageOutcome::Incapacitated));
        assert_eq!(character.state().health, -50);
        assert!(character.state().movement_locked);

        assert_eq!(take_damage(&mut character, 10), Ok(DamageOutcome::AlreadyIncapacitated));
        assert_eq!(character.state().health, -60);
        assert!(character.state().movement_locked);
    }

    #[test]
    fn test_damage_to_exactly_zero_incapacitates() {
        let mut character = authority();
        assert_eq!(take_damage(&mut character, 40), Ok(DamageOutcome::Wounded));
        assert!(!character.state().movement_locked);
        assert_eq!(take_damage(&mut character, 60), Ok(DamageOutcome::Incapacitated));
        assert_eq!(character.state().health, 0);
    }

    #[test]
    fn test_validators_accept_everything() {
        assert_eq!(validate_switch_weapon(i32::MAX), Validation::Accepted);
        assert_eq!(validate_fire(), Validation::Accepted);
    }
}
