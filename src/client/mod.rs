//! Observer-side runtime: a UDP client that mirrors session state and
//! forwards player intents to the authority.

pub mod input;
pub mod link;
pub mod observer;

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tokio::net::UdpSocket;

use crate::domain::dispatcher::Dispatch;
use crate::domain::replication::PresentationHooks;
use crate::error::Result;
use crate::handlers::models::ServerPacket;

pub use input::{handle_intent, InputIntent};
pub use link::{ChannelAuthorityLink, UdpAuthorityLink};
pub use observer::ObserverSession;

pub struct ObserverClient {
    socket: Arc<UdpSocket>,
    link: UdpAuthorityLink,
    session: ObserverSession,
    character_id: u32,
}

impl ObserverClient {
    /// Bind a local socket and announce `character_id` to the session.
    /// The id comes from the HTTP join endpoint.
    pub async fn connect(
        server_addr: SocketAddr,
        session_code: String,
        character_id: u32,
        name: &str,
    ) -> Result<Self> {
        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = Arc::new(UdpSocket::bind(bind_addr).await?);
        let link = UdpAuthorityLink::new(socket.clone(), server_addr, session_code);

        link.send_raw(&json!({
            "type": "join",
            "session_code": link.session_code(),
            "character_id": character_id,
            "name": name
        }));

        Ok(Self {
            socket,
            link,
            session: ObserverSession::new(),
            character_id,
        })
    }

    pub fn link(&self) -> &UdpAuthorityLink {
        &self.link
    }

    pub fn session(&self) -> &ObserverSession {
        &self.session
    }

    pub fn character_id(&self) -> u32 {
        self.character_id
    }

    /// Route an input intent for the local character. Returns `None` until
    /// the welcome snapshot has created the local mirror.
    pub fn handle_intent(&mut self, intent: InputIntent) -> Option<Dispatch> {
        let character = self.session.local_character_mut()?;
        input::handle_intent(character, &self.link, intent)
    }

    pub fn send_heartbeat(&self) {
        self.link.send_raw(&json!({
            "type": "heartbeat",
            "session_code": self.link.session_code(),
            "character_id": self.character_id
        }));
    }

    pub fn send_position(&self, position: (f32, f32, f32), rotation: (f32, f32, f32)) {
        self.link.send_raw(&json!({
            "type": "position_update",
            "session_code": self.link.session_code(),
            "character_id": self.character_id,
            "position": { "x": position.0, "y": position.1, "z": position.2 },
            "rotation": { "x": rotation.0, "y": rotation.1, "z": rotation.2 }
        }));
    }

    pub fn leave(&self) {
        self.link.send_raw(&json!({
            "type": "leave",
            "session_code": self.link.session_code(),
            "character_id": self.character_id
        }));
    }

    /// Wait for one datagram from the authority and apply it
    pub async fn recv_packet<H: PresentationHooks + ?Sized>(&mut self, hooks: &mut H) -> Result<ServerPacket> {
        let mut buf = [0u8; 8192];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            if from != self.link.server_addr() {
                log::debug!("Ignoring datagram from {}", from);
                continue;
            }

            let packet: ServerPacket = serde_json::from_slice(&buf[..len])?;
            self.session.apply_packet(packet.clone(), hooks)?;
            return Ok(packet);
        }
    }
}
