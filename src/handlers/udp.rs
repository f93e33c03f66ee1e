use serde_json::Value;
use std::net::SocketAddr;
use crate::state::server_state::ServerState;
use crate::state::commands::SessionCommand;
use std::sync::Arc;

/// Thin UDP packet handler - no locks in hot path
/// Parses packet and enqueues command to the session's command queue
pub async fn handle_udp_packet(
    packet: Value,
    addr: SocketAddr,
    state: &Arc<ServerState>,
) {
    let session_code = packet.get("session_code").and_then(|v| v.as_str());

    let Some(tx) = session_code.and_then(|code| state.get_session_tx(code)) else {
        log::debug!("UDP packet for unknown session: {:?}", session_code);
        return;
    };

    let Some(cmd) = parse_command(&packet, addr) else {
        log::debug!("Dropping malformed packet from {}", addr);
        return;
    };

    // Non-blocking send - drop if queue is full (prevents backpressure)
    if tx.try_send(cmd).is_err() {
        log::debug!("Command queue full for session {}, dropping packet", session_code.unwrap_or("unknown"));
    }
}

fn parse_u32(packet: &Value, key: &str) -> Option<u32> {
    packet.get(key)
        .and_then(|v| v.as_u64())
        .and_then(|v| u32::try_from(v).ok())
}

fn parse_vec3(packet: &Value, key: &str) -> (f32, f32, f32) {
    let Some(obj) = packet.get(key).and_then(|v| v.as_object()) else {
        return (0.0, 0.0, 0.0);
    };
    (
        obj.get("x").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
        obj.get("y").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
        obj.get("z").and_then(|v| v.as_f64()).unwrap_or(0.0) as f32,
    )
}

/// Parse UDP packet into SessionCommand.
///
/// Packets without a character id, and action requests without a sequence
/// number, are dropped.
pub fn parse_command(packet: &Value, addr: SocketAddr) -> Option<SessionCommand> {
    let character_id = parse_u32(packet, "character_id")?;

    let cmd = match packet.get("type").and_then(|v| v.as_str()) {
        Some("join") => {
            let name = packet.get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();
            SessionCommand::Join { character_id, name, addr: Some(addr) }
        }
        Some("leave") => SessionCommand::Leave { character_id },
        Some("position_update") => SessionCommand::PositionUpdate {
            character_id,
            position: parse_vec3(packet, "position"),
            rotation: parse_vec3(packet, "rotation"),
            addr,
        },
        Some("switch_weapon") => {
            // Any i32 is passed through unvalidated; anything else is not a switch
            let weapon = packet.get("weapon")
                .and_then(|v| v.as_i64())
                .and_then(|v| i32::try_from(v).ok())?;
            SessionCommand::SwitchWeapon {
                character_id,
                seq: parse_u32(packet, "seq")?,
                weapon,
            }
        }
        Some("fire") => SessionCommand::Fire {
            character_id,
            seq: parse_u32(packet, "seq")?,
        },
        Some("stop_fire") => SessionCommand::StopFire { character_id },
        Some("keepalive") | Some("heartbeat") => SessionCommand::Heartbeat { character_id, addr },
        _ => {
            log::debug!("Unknown packet type: {:?}", packet.get("type"));
            // Fall back to a heartbeat to refresh the timestamp
            SessionCommand::Heartbeat { character_id, addr }
        }
    };
    Some(cmd)
}
