use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Which side of the authority split a character instance lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Holds the canonical, writable state
    Authority,
    /// Holds a read-only mirror updated from replicated values
    Observer,
}

/// Replicated gameplay state of one character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
    pub weapon: i32,
    pub health: i32,
    pub pistol_ammo: i32,
    pub rifle_ammo: i32,
    pub movement_locked: bool,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self {
            weapon: 0,
            health: 100,
            pistol_ammo: 100,
            rifle_ammo: 100,
            movement_locked: false,
        }
    }
}

impl CharacterState {
    pub fn is_incapacitated(&self) -> bool {
        self.health <= 0
    }
}

/// A player-controlled character on either side of the split
#[derive(Debug, Clone)]
pub struct Character {
    pub id: u32,
    pub name: String,
    role: Role,
    pub(crate) state: CharacterState,
    pub position: (f32, f32, f32),
    pub rotation: (f32, f32, f32),
    pub last_update: SystemTime,

    // Highest remote request sequence accepted (authority only)
    pub last_request_seq: Option<u32>,
}

impl Character {
    pub fn new(id: u32, name: String, role: Role, state: CharacterState) -> Self {
        Self {
            id,
            name,
            role,
            state,
            position: (0.0, 0.0, 0.0),
            rotation: (0.0, 0.0, 0.0),
            last_update: SystemTime::now(),
            last_request_seq: None,
        }
    }

    pub fn authority(id: u32, name: String, state: CharacterState) -> Self {
        Self::new(id, name, Role::Authority, state)
    }

    pub fn observer(id: u32, name: String, state: CharacterState) -> Self {
        Self::new(id, name, Role::Observer, state)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authority(&self) -> bool {
        self.role == Role::Authority
    }

    /// Read-only view; mutation goes through the dispatcher or replication
    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    /// Accept a remote request only if its sequence is newer than anything
    /// seen so far. Gives at-most-once, in-order delivery over UDP.
    pub fn accept_request_seq(&mut self, seq: u32) -> bool {
        match self.last_request_seq {
            Some(last) if seq <= last => false,
            _ => {
                self.last_request_seq = Some(seq);
                true
            }
        }
    }

    pub fn to_sync_state(&self) -> CharacterSyncState {
        CharacterSyncState {
            id: self.id,
            weapon: self.state.weapon,
            health: self.state.health,
            pistol_ammo: self.state.pistol_ammo,
            rifle_ammo: self.state.rifle_ammo,
            movement_locked: self.state.movement_locked,
        }
    }

    pub fn to_snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: self.state.clone(),
            position: self.position,
            rotation: self.rotation,
        }
    }
}

/// Last replicated values, used for delta tracking
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSyncState {
    pub id: u32,
    pub weapon: i32,
    pub health: i32,
    pub pistol_ammo: i32,
    pub rifle_ammo: i32,
    pub movement_locked: bool,
}

/// Full character state sent to observers that have no mirror yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub id: u32,
    pub name: String,
    #[serde(flatten)]
    pub state: CharacterState,
    pub position: (f32, f32, f32),
    pub rotation: (f32, f32, f32),
}
