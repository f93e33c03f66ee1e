use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tokio::net::UdpSocket;
use tokio::time::interval;
use crate::domain::dispatcher::{self, RequestedAction};
use crate::domain::game_mode::GameMode;
use crate::domain::sessions;
use crate::error::SessionError;
use crate::handlers::models::ServerPacket;
use crate::state::session::Session;
use crate::state::commands::{SessionCommand, drain_and_coalesce};
use crate::tick::delta_sync;
use crate::utils::buffers::{PacketBuffer, SmallCharacterVec};
use crate::utils::config::Config;

/// A packet addressed to one observer
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub addr: SocketAddr,
    pub packet: ServerPacket,
}

/// Session membership and movement changes produced by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Joined(u32),
    Left(u32),
    Moved(u32),
}

/// Per-session tick loop - processes commands and broadcasts updates
/// Runs at fixed tick rate (50Hz by default)
pub async fn session_tick_loop(
    session: Arc<RwLock<Session>>,
    mut command_rx: mpsc::Receiver<SessionCommand>,
    socket: Arc<UdpSocket>,
    game_mode: Arc<GameMode>,
    config: Arc<Config>,
) {
    let mut tick_timer = interval(config.tick_interval());
    let mut send_buffer = PacketBuffer::default();

    loop {
        tick_timer.tick().await;

        let commands = drain_and_coalesce(&mut command_rx);

        // Single lock per tick; the session has exactly one writer
        let outgoing = {
            let mut session_guard = session.write().await;
            tick_session(&mut session_guard, commands, &game_mode, &config)
        };

        send_packets(&socket, &outgoing, &mut send_buffer).await;
    }
}

/// Run one tick against the authoritative session and return every packet
/// that should go out.
pub fn tick_session(
    session: &mut Session,
    commands: Vec<SessionCommand>,
    game_mode: &GameMode,
    config: &Config,
) -> Vec<Outgoing> {
    let mut joined = SmallCharacterVec::new();
    let mut left = SmallCharacterVec::new();
    let mut moved = SmallCharacterVec::new();

    for cmd in commands {
        match process_command(session, game_mode, cmd) {
            Some(Change::Joined(id)) => joined.push(id),
            Some(Change::Left(id)) => left.push(id),
            Some(Change::Moved(id)) => moved.push(id),
            None => {}
        }
    }

    let removed = sessions::cleanup_inactive(session, config.character_inactivity_timeout_secs);
    for id in &removed {
        log::info!("Character {} timed out of session {}", id, session.code);
    }
    left.extend(removed);

    let mut outgoing = Vec::new();

    for &character_id in &joined {
        welcome_character(session, character_id, &mut outgoing);
    }

    for &character_id in &left {
        broadcast(session, None, ServerPacket::CharacterLeft { character_id }, &mut outgoing);
    }

    for event in delta_sync::collect_position_events(session, &moved) {
        broadcast(session, Some(event.character_id()), ServerPacket::from(&event), &mut outgoing);
    }

    // Delta sync - only send changes (weapon, health, ammo, lock)
    for event in delta_sync::collect_state_events(session) {
        broadcast(session, None, ServerPacket::from(&event), &mut outgoing);
    }

    // Deltas go out once over UDP; a periodic full snapshot repairs lost ones
    session.tick_count += 1;
    let every = u64::from(config.snapshot_interval_ticks);
    if every > 0 && session.tick_count % every == 0 {
        let characters = session.characters.values().map(|c| c.to_snapshot()).collect();
        broadcast(session, None, ServerPacket::Snapshot { characters }, &mut outgoing);
    }

    outgoing
}

/// Process a single command
fn process_command(
    session: &mut Session,
    game_mode: &GameMode,
    cmd: SessionCommand,
) -> Option<Change> {
    match cmd {
        SessionCommand::Join { character_id, name, addr } => {
            if !session.characters.contains_key(&character_id) {
                let character = game_mode.spawn_character(character_id, name);
                if let Err(e) = sessions::add_character(session, character) {
                    log::warn!("Failed to add character {}: {}", character_id, e);
                    return None;
                }
            }
            if let Some(addr) = addr {
                if let Err(e) = sessions::bind_address(session, character_id, addr) {
                    log::warn!("Rejected join for character {} from {}: {}", character_id, addr, e);
                    return None;
                }
                // A (re)joining client numbers its requests from scratch
                if let Some(character) = session.characters.get_mut(&character_id) {
                    character.last_request_seq = None;
                }
            }
            touch(session, character_id);
            Some(Change::Joined(character_id))
        }
        SessionCommand::Leave { character_id } => {
            sessions::remove_character(session, character_id)
                .map(|_| Change::Left(character_id))
        }
        SessionCommand::PositionUpdate { character_id, position, rotation, addr } => {
            if session.characters.contains_key(&character_id) {
                session.client_addresses.entry(character_id).or_insert(addr);
            }
            match sessions::update_position(session, character_id, position, rotation) {
                Ok(()) => Some(Change::Moved(character_id)),
                Err(SessionError::MovementLocked(_)) => None,
                Err(e) => {
                    log::debug!("Position update failed for character {}: {}", character_id, e);
                    None
                }
            }
        }
        SessionCommand::SwitchWeapon { character_id, seq, weapon } => {
            run_remote_action(session, character_id, seq, RequestedAction::SwitchWeapon(weapon));
            None
        }
        SessionCommand::Fire { character_id, seq } => {
            run_remote_action(session, character_id, seq, RequestedAction::Fire);
            None
        }
        SessionCommand::StopFire { character_id } => {
            if let Some(character) = session.characters.get_mut(&character_id) {
                dispatcher::release_fire(character);
            }
            None
        }
        SessionCommand::TakeDamage { character_id, amount } => {
            match sessions::apply_damage(session, character_id, amount) {
                Ok(outcome) => log::debug!("Character {} took {} damage: {:?}", character_id, amount, outcome),
                Err(e) => log::debug!("Damage failed for character {}: {}", character_id, e),
            }
            None
        }
        SessionCommand::Heartbeat { character_id, addr } => {
            if session.characters.contains_key(&character_id) {
                session.client_addresses.entry(character_id).or_insert(addr);
            }
            touch(session, character_id);
            None
        }
    }
}

fn touch(session: &mut Session, character_id: u32) {
    if let Err(e) = sessions::touch(session, character_id) {
        log::debug!("Keepalive for character {} ignored: {}", character_id, e);
    }
}

fn run_remote_action(session: &mut Session, character_id: u32, seq: u32, action: RequestedAction) {
    match sessions::handle_remote_action(session, character_id, seq, action) {
        Ok(outcome) => log::debug!("Character {} {:?} (seq {}): {:?}", character_id, action, seq, outcome),
        Err(e) => log::debug!("{:?} failed for character {}: {}", action, character_id, e),
    }
}

/// Greet a joining observer with the full session state and announce the
/// character to everyone else.
fn welcome_character(session: &mut Session, character_id: u32, outgoing: &mut Vec<Outgoing>) {
    let Some(character) = session.characters.get(&character_id) else {
        return;
    };
    let snapshot = character.to_snapshot();

    if let Some(&addr) = session.client_addresses.get(&character_id) {
        outgoing.push(Outgoing {
            addr,
            packet: ServerPacket::Welcome {
                character_id,
                session_code: session.code.clone(),
            },
        });
        outgoing.push(Outgoing {
            addr,
            packet: ServerPacket::Snapshot {
                characters: session.characters.values().map(|c| c.to_snapshot()).collect(),
            },
        });
    }

    broadcast(session, Some(character_id), ServerPacket::CharacterJoined { character: snapshot }, outgoing);

    // Everyone now holds these values
    session.record_synced(character_id);
}

fn broadcast(
    session: &Session,
    except: Option<u32>,
    packet: ServerPacket,
    outgoing: &mut Vec<Outgoing>,
) {
    for (&client_id, &addr) in &session.client_addresses {
        if Some(client_id) != except {
            outgoing.push(Outgoing { addr, packet: packet.clone() });
        }
    }
}

/// Serialize and send packets, reusing one buffer
pub async fn send_packets(socket: &UdpSocket, outgoing: &[Outgoing], buffer: &mut PacketBuffer) {
    for item in outgoing {
        let data = match buffer.write_json(&item.packet) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to serialize packet: {}", e);
                continue;
            }
        };
        if let Err(e) = socket.send_to(data, item.addr).await {
            log::debug!("Failed to send packet to {}: {:?}", item.addr, e);
        }
    }
}
