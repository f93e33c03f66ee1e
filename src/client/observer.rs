use std::collections::HashMap;

use crate::domain::replication::{self, PresentationHooks};
use crate::error::DispatchError;
use crate::handlers::models::ServerPacket;
use crate::state::character::{Character, CharacterSnapshot};

/// Client-side view of a session: read-only mirrors of every character,
/// kept current from authority packets.
#[derive(Debug, Default)]
pub struct ObserverSession {
    local_id: Option<u32>,
    session_code: Option<String>,
    characters: HashMap<u32, Character>,
}

impl ObserverSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_id(&self) -> Option<u32> {
        self.local_id
    }

    pub fn session_code(&self) -> Option<&str> {
        self.session_code.as_deref()
    }

    pub fn character(&self, id: u32) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// The locally controlled mirror, for routing input intents
    pub fn local_character_mut(&mut self) -> Option<&mut Character> {
        let id = self.local_id?;
        self.characters.get_mut(&id)
    }

    /// Apply one packet from the authority, firing hooks for changes
    pub fn apply_packet<H: PresentationHooks + ?Sized>(
        &mut self,
        packet: ServerPacket,
        hooks: &mut H,
    ) -> Result<(), DispatchError> {
        if let Some(event) = packet.to_sync_event() {
            let character_id = event.character_id();
            return match self.characters.get_mut(&character_id) {
                Some(mirror) => replication::apply_sync_event(mirror, &event, hooks),
                None => {
                    log::debug!("Update for unknown character {}", character_id);
                    Ok(())
                }
            };
        }

        match packet {
            ServerPacket::Welcome { character_id, session_code } => {
                log::info!("Joined session {} as character {}", session_code, character_id);
                self.local_id = Some(character_id);
                self.session_code = Some(session_code);
            }
            ServerPacket::Snapshot { characters } => {
                self.characters.retain(|id, _| characters.iter().any(|c| c.id == *id));
                for snapshot in characters {
                    self.upsert(snapshot, hooks)?;
                }
            }
            ServerPacket::CharacterJoined { character } => self.upsert(character, hooks)?,
            ServerPacket::CharacterLeft { character_id } => {
                self.characters.remove(&character_id);
            }
            _ => {}
        }
        Ok(())
    }

    fn upsert<H: PresentationHooks + ?Sized>(
        &mut self,
        snapshot: CharacterSnapshot,
        hooks: &mut H,
    ) -> Result<(), DispatchError> {
        match self.characters.get_mut(&snapshot.id) {
            Some(mirror) => replication::refresh_from_snapshot(mirror, snapshot, hooks),
            None => {
                let mirror = replication::mirror_from_snapshot(snapshot, hooks);
                self.characters.insert(mirror.id, mirror);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::character::CharacterState;

    #[derive(Default)]
    struct Recorder {
        weapons: Vec<(u32, i32)>,
    }

    impl PresentationHooks for Recorder {
        fn on_weapon_changed(&mut self, character_id: u32, weapon: i32) {
            self.weapons.push((character_id, weapon));
        }
    }

    fn snapshot(id: u32, weapon: i32) -> CharacterSnapshot {
        CharacterSnapshot {
            id,
            name: format!("P{}", id),
            state: CharacterState { weapon, ..CharacterState::default() },
            position: (0.0, 1.0, 0.0),
            rotation: (0.0, 0.0, 0.0),
        }
    }

    #[test]
    fn test_welcome_and_snapshot() {
        let mut session = ObserverSession::new();
        let mut hooks = Recorder::default();

        session.apply_packet(ServerPacket::Welcome { character_id: 2, session_code: "TEST".to_string() }, &mut hooks).unwrap();
        session.apply_packet(ServerPacket::Snapshot { characters: vec![snapshot(1, 1), snapshot(2, 0)] }, &mut hooks).unwrap();

        assert_eq!(session.local_id(), Some(2));
        assert_eq!(session.session_code(), Some("TEST"));
        assert_eq!(session.characters().count(), 2);
        assert!(session.characters().all(|c| !c.is_authority()));
        assert!(session.local_character_mut().is_some());

        hooks.weapons.sort();
        assert_eq!(hooks.weapons, vec![(1, 1), (2, 0)]);
    }

    #[test]
    fn test_updates_and_leave() {
        let mut session = ObserverSession::new();
        let mut hooks = Recorder::default();
        session.apply_packet(ServerPacket::CharacterJoined { character: snapshot(1, 0) }, &mut hooks).unwrap();

        session.apply_packet(ServerPacket::WeaponChanged { character_id: 1, weapon: 2 }, &mut hooks).unwrap();
        session.apply_packet(ServerPacket::RifleAmmoChanged { character_id: 1, rifle_ammo: 50 }, &mut hooks).unwrap();
        // Unknown characters are ignored
        session.apply_packet(ServerPacket::WeaponChanged { character_id: 9, weapon: 1 }, &mut hooks).unwrap();

        let mirror = session.character(1).unwrap();
        assert_eq!(mirror.state().weapon, 2);
        assert_eq!(mirror.state().rifle_ammo, 50);
        assert_eq!(hooks.weapons, vec![(1, 0), (1, 2)]);

        session.apply_packet(ServerPacket::CharacterLeft { character_id: 1 }, &mut hooks).unwrap();
        assert!(session.character(1).is_none());
    }

    #[test]
    fn test_snapshot_drops_stale_mirrors() {
        let mut session = ObserverSession::new();
        let mut hooks = Recorder::default();
        session.apply_packet(ServerPacket::CharacterJoined { character: snapshot(1, 0) }, &mut hooks).unwrap();
        session.apply_packet(ServerPacket::Snapshot { characters: vec![snapshot(2, 0)] }, &mut hooks).unwrap();

        assert!(session.character(1).is_none());
        assert!(session.character(2).is_some());
    }
}
