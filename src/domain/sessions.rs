use crate::domain::dispatcher::{self, DamageOutcome, FireOutcome, RequestedAction, Validation};
use crate::error::SessionError;
use crate::state::character::Character;
use crate::state::session::Session;
use std::time::SystemTime;
use std::net::SocketAddr;

/// What the authority did with a forwarded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    Switched,
    Fired(FireOutcome),
    /// Sequence number already seen or older than the last accepted one
    Duplicate,
    Rejected(&'static str),
}

/// Add an authoritative character to a session
pub fn add_character(session: &mut Session, character: Character) -> Result<(), SessionError> {
    if session.characters.len() >= session.max_characters as usize {
        return Err(SessionError::Full);
    }

    if session.characters.contains_key(&character.id) {
        return Err(SessionError::CharacterExists(character.id));
    }

    session.characters.insert(character.id, character);
    Ok(())
}

/// Remove a character from a session
pub fn remove_character(session: &mut Session, character_id: u32) -> Option<Character> {
    session.client_addresses.remove(&character_id);
    session.last_sync_state.remove(&character_id);
    session.characters.remove(&character_id)
}

fn character_mut(session: &mut Session, character_id: u32) -> Result<&mut Character, SessionError> {
    session.characters.get_mut(&character_id)
        .ok_or(SessionError::CharacterNotFound(character_id))
}

/// Update character position and rotation. Incapacitated characters no
/// longer accept location updates.
pub fn update_position(
    session: &mut Session,
    character_id: u32,
    position: (f32, f32, f32),
    rotation: (f32, f32, f32),
) -> Result<(), SessionError> {
    let character = character_mut(session, character_id)?;
    character.last_update = SystemTime::now();

    if character.state().movement_locked {
        return Err(SessionError::MovementLocked(character_id));
    }

    character.position = position;
    character.rotation = rotation;
    Ok(())
}

/// Bind a character to the UDP address it joined from. The first address
/// sticks until the character leaves or times out.
pub fn bind_address(
    session: &mut Session,
    character_id: u32,
    addr: SocketAddr,
) -> Result<(), SessionError> {
    if !session.characters.contains_key(&character_id) {
        return Err(SessionError::CharacterNotFound(character_id));
    }
    match session.client_addresses.get(&character_id) {
        Some(&bound) if bound != addr => Err(SessionError::AddressMismatch(character_id)),
        _ => {
            session.client_addresses.insert(character_id, addr);
            Ok(())
        }
    }
}

/// Refresh the activity timestamp
pub fn touch(session: &mut Session, character_id: u32) -> Result<(), SessionError> {
    character_mut(session, character_id)?.last_update = SystemTime::now();
    Ok(())
}

/// Run a forwarded request on the authority: sequence check, validator,
/// then the dispatcher.
pub fn handle_remote_action(
    session: &mut Session,
    character_id: u32,
    seq: u32,
    action: RequestedAction,
) -> Result<RemoteOutcome, SessionError> {
    let character = character_mut(session, character_id)?;

    if !character.accept_request_seq(seq) {
        return Ok(RemoteOutcome::Duplicate);
    }
    character.last_update = SystemTime::now();

    let validation = match action {
        RequestedAction::SwitchWeapon(index) => dispatcher::validate_switch_weapon(index),
        RequestedAction::Fire => dispatcher::validate_fire(),
    };
    if let Validation::Rejected(reason) = validation {
        return Ok(RemoteOutcome::Rejected(reason));
    }

    let outcome = match action {
        RequestedAction::SwitchWeapon(index) => {
            dispatcher::apply_weapon_switch(character, index)?;
            RemoteOutcome::Switched
        }
        RequestedAction::Fire => RemoteOutcome::Fired(dispatcher::apply_fire(character)?),
    };

    Ok(outcome)
}

/// Authority-side damage
pub fn apply_damage(
    session: &mut Session,
    character_id: u32,
    amount: i32,
) -> Result<DamageOutcome, SessionError> {
    let character = character_mut(session, character_id)?;
    Ok(dispatcher::take_damage(character, amount)?)
}

/// Clean up inactive characters
/// Returns list of removed character IDs
pub fn cleanup_inactive(
    session: &mut Session,
    timeout_secs: u64,
) -> Vec<u32> {
    let now = SystemTime::now();
    let mut inactive = Vec::new();

    for (character_id, character) in &session.characters {
        if let Ok(duration) = now.duration_since(character.last_update) {
            if duration.as_secs() > timeout_secs {
                inactive.push(*character_id);
            }
        }
    }

    for character_id in &inactive {
        remove_character(session, *character_id);
    }

    inactive
}
