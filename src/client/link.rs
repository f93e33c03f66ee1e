use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{json, Value};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::domain::dispatcher::{AuthorityLink, RequestedAction};
use crate::state::commands::SessionCommand;

/// Build the datagram for a forwarded action request
pub fn action_packet(session_code: &str, character_id: u32, seq: u32, action: RequestedAction) -> Value {
    match action {
        RequestedAction::SwitchWeapon(weapon) => json!({
            "type": "switch_weapon",
            "session_code": session_code,
            "character_id": character_id,
            "seq": seq,
            "weapon": weapon
        }),
        RequestedAction::Fire => json!({
            "type": "fire",
            "session_code": session_code,
            "character_id": character_id,
            "seq": seq
        }),
    }
}

/// Sends requests to the authority as UDP datagrams. Non-blocking: a full
/// socket buffer drops the request.
pub struct UdpAuthorityLink {
    socket: Arc<UdpSocket>,
    server_addr: SocketAddr,
    session_code: String,
    next_seq: AtomicU32,
}

impl UdpAuthorityLink {
    pub fn new(socket: Arc<UdpSocket>, server_addr: SocketAddr, session_code: String) -> Self {
        Self {
            socket,
            server_addr,
            session_code,
            next_seq: AtomicU32::new(1),
        }
    }

    pub fn session_code(&self) -> &str {
        &self.session_code
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Send a session-level packet (join, heartbeat, position) as-is
    pub fn send_raw(&self, packet: &Value) {
        let data = match serde_json::to_vec(packet) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to serialize packet: {}", e);
                return;
            }
        };
        if let Err(e) = self.socket.try_send_to(&data, self.server_addr) {
            log::debug!("Dropped packet to {}: {}", self.server_addr, e);
        }
    }
}

impl AuthorityLink for UdpAuthorityLink {
    fn send(&self, character_id: u32, action: RequestedAction) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.send_raw(&action_packet(&self.session_code, character_id, seq, action));
    }
}

/// In-process link straight onto a session's command queue, for a
/// listen server or tests.
pub struct ChannelAuthorityLink {
    tx: mpsc::Sender<SessionCommand>,
    next_seq: AtomicU32,
}

impl ChannelAuthorityLink {
    pub fn new(tx: mpsc::Sender<SessionCommand>) -> Self {
        Self {
            tx,
            next_seq: AtomicU32::new(1),
        }
    }
}

impl AuthorityLink for ChannelAuthorityLink {
    fn send(&self, character_id: u32, action: RequestedAction) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let cmd = match action {
            RequestedAction::SwitchWeapon(weapon) => SessionCommand::SwitchWeapon { character_id, seq, weapon },
            RequestedAction::Fire => SessionCommand::Fire { character_id, seq },
        };
        if let Err(e) = self.tx.try_send(cmd) {
            log::debug!("Dropped request for character {}: {}", character_id, e);
        }
    }
}
