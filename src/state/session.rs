use std::collections::HashMap;
use std::net::SocketAddr;

use crate::state::character::{Character, CharacterSyncState};

pub type SessionCode = String;

/// Session state - one authoritative group of characters sharing a tick loop
#[derive(Debug)]
pub struct Session {
    pub code: SessionCode,
    pub characters: HashMap<u32, Character>,
    pub client_addresses: HashMap<u32, SocketAddr>,
    pub max_characters: u32,
    pub scene: String,

    // Delta tracking for efficient state sync
    pub last_sync_state: HashMap<u32, CharacterSyncState>,
    pub tick_count: u64,
}

impl Session {
    pub fn new(code: SessionCode, max_characters: u32, scene: String) -> Self {
        Self {
            code,
            characters: HashMap::new(),
            client_addresses: HashMap::new(),
            max_characters,
            scene,
            last_sync_state: HashMap::new(),
            tick_count: 0,
        }
    }

    /// Record the character's current values as already replicated, e.g.
    /// after a full snapshot went out.
    pub fn record_synced(&mut self, character_id: u32) {
        if let Some(character) = self.characters.get(&character_id) {
            self.last_sync_state.insert(character_id, character.to_sync_state());
        }
    }
}
