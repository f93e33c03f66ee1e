use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Command sent from network handlers to the session tick loop
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    // Character management
    Join {
        character_id: u32,
        name: String,
        addr: Option<SocketAddr>,
    },
    Leave {
        character_id: u32,
    },

    // Position (only latest kept per character)
    PositionUpdate {
        character_id: u32,
        position: (f32, f32, f32),
        rotation: (f32, f32, f32),
        addr: SocketAddr,
    },

    // Remote action requests, applied in arrival order
    SwitchWeapon {
        character_id: u32,
        seq: u32,
        weapon: i32,
    },
    Fire {
        character_id: u32,
        seq: u32,
    },
    StopFire {
        character_id: u32,
    },

    // Authority-side damage (HTTP admin or game logic)
    TakeDamage {
        character_id: u32,
        amount: i32,
    },

    // Keepalive (only latest kept per character)
    Heartbeat {
        character_id: u32,
        addr: SocketAddr,
    },
}

/// Drain the queue, keeping only the latest position and heartbeat per
/// character. Everything else keeps its arrival order.
pub fn drain_and_coalesce(
    rx: &mut mpsc::Receiver<SessionCommand>
) -> Vec<SessionCommand> {
    let mut latest_positions: HashMap<u32, SessionCommand> = HashMap::new();
    let mut latest_heartbeats: HashMap<u32, SessionCommand> = HashMap::new();
    let mut other_commands: Vec<SessionCommand> = Vec::new();

    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            SessionCommand::PositionUpdate { character_id, .. } => {
                latest_positions.insert(character_id, cmd);
            }
            SessionCommand::Heartbeat { character_id, .. } => {
                latest_heartbeats.insert(character_id, cmd);
            }
            _ => other_commands.push(cmd),
        }
    }

    // Actions first, then latest positions, then heartbeats
    other_commands.extend(latest_positions.into_values());
    other_commands.extend(latest_heartbeats.into_values());
    other_commands
}
