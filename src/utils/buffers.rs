use serde::Serialize;
use smallvec::SmallVec;

/// Type alias for small collections that avoid allocations
pub type SmallCharacterVec = SmallVec<[u32; 8]>;
pub type SmallEventVec = SmallVec<[SyncEvent; 16]>;

/// Field-level change produced by the authority for delta replication
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    WeaponChanged { character_id: u32, weapon: i32 },
    HealthChanged { character_id: u32, health: i32 },
    PistolAmmoChanged { character_id: u32, pistol_ammo: i32 },
    RifleAmmoChanged { character_id: u32, rifle_ammo: i32 },
    MovementLocked { character_id: u32 },
    PositionChanged { character_id: u32, position: (f32, f32, f32), rotation: (f32, f32, f32) },
}

impl SyncEvent {
    pub fn character_id(&self) -> u32 {
        match self {
            SyncEvent::WeaponChanged { character_id, .. }
            | SyncEvent::HealthChanged { character_id, .. }
            | SyncEvent::PistolAmmoChanged { character_id, .. }
            | SyncEvent::RifleAmmoChanged { character_id, .. }
            | SyncEvent::MovementLocked { character_id }
            | SyncEvent::PositionChanged { character_id, .. } => *character_id,
        }
    }
}

/// Reusable buffer for packet serialization
pub struct PacketBuffer {
    buffer: Vec<u8>,
}

impl PacketBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Serialize `value` as JSON, replacing the previous contents
    pub fn write_json<T: Serialize>(&mut self, value: &T) -> serde_json::Result<&[u8]> {
        self.buffer.clear();
        serde_json::to_writer(&mut self.buffer, value)?;
        Ok(&self.buffer)
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new(1024)
    }
}
