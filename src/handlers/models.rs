use serde::{Deserialize, Serialize};

use crate::state::character::CharacterSnapshot;
use crate::utils::buffers::SyncEvent;

/// HTTP Request/Response DTOs

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateSessionRequest {
    pub code: String,
    pub max_characters: Option<u32>,
    pub scene: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JoinSessionRequest {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct JoinSessionResponse {
    pub session: SessionInfo,
    pub character_id: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DamageRequest {
    pub amount: i32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionInfo {
    pub code: String,
    pub character_count: usize,
    pub max_characters: u32,
    pub characters: Vec<CharacterInfo>,
    pub udp_port: u16,
    pub scene: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CharacterInfo {
    pub id: u32,
    pub name: String,
}

/// Datagrams sent from the authority to observers
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerPacket {
    Welcome {
        character_id: u32,
        session_code: String,
    },
    Snapshot {
        characters: Vec<CharacterSnapshot>,
    },
    CharacterJoined {
        character: CharacterSnapshot,
    },
    CharacterLeft {
        character_id: u32,
    },
    PositionUpdate {
        character_id: u32,
        position: (f32, f32, f32),
        rotation: (f32, f32, f32),
    },
    WeaponChanged {
        character_id: u32,
        weapon: i32,
    },
    HealthChanged {
        character_id: u32,
        health: i32,
    },
    PistolAmmoChanged {
        character_id: u32,
        pistol_ammo: i32,
    },
    RifleAmmoChanged {
        character_id: u32,
        rifle_ammo: i32,
    },
    MovementLocked {
        character_id: u32,
    },
}

impl From<&SyncEvent> for ServerPacket {
    fn from(event: &SyncEvent) -> Self {
        match *event {
            SyncEvent::WeaponChanged { character_id, weapon } => {
                ServerPacket::WeaponChanged { character_id, weapon }
            }
            SyncEvent::HealthChanged { character_id, health } => {
                ServerPacket::HealthChanged { character_id, health }
            }
            SyncEvent::PistolAmmoChanged { character_id, pistol_ammo } => {
                ServerPacket::PistolAmmoChanged { character_id, pistol_ammo }
            }
            SyncEvent::RifleAmmoChanged { character_id, rifle_ammo } => {
                ServerPacket::RifleAmmoChanged { character_id, rifle_ammo }
            }
            SyncEvent::MovementLocked { character_id } => {
                ServerPacket::MovementLocked { character_id }
            }
            SyncEvent::PositionChanged { character_id, position, rotation } => {
                ServerPacket::PositionUpdate { character_id, position, rotation }
            }
        }
    }
}

impl ServerPacket {
    /// The field change carried by this packet, if it is a replication update
    pub fn to_sync_event(&self) -> Option<SyncEvent> {
        let event = match *self {
            ServerPacket::WeaponChanged { character_id, weapon } => {
                SyncEvent::WeaponChanged { character_id, weapon }
            }
            ServerPacket::HealthChanged { character_id, health } => {
                SyncEvent::HealthChanged { character_id, health }
            }
            ServerPacket::PistolAmmoChanged { character_id, pistol_ammo } => {
                SyncEvent::PistolAmmoChanged { character_id, pistol_ammo }
            }
            ServerPacket::RifleAmmoChanged { character_id, rifle_ammo } => {
                SyncEvent::RifleAmmoChanged { character_id, rifle_ammo }
            }
            ServerPacket::MovementLocked { character_id } => {
                SyncEvent::MovementLocked { character_id }
            }
            ServerPacket::PositionUpdate { character_id, position, rotation } => {
                SyncEvent::PositionChanged { character_id, position, rotation }
            }
            _ => return None,
        };
        Some(event)
    }
}
