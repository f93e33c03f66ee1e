pub mod http;
pub mod models;
pub mod udp;

pub use http::AppState;
pub use models::{CharacterInfo, CreateSessionRequest, JoinSessionRequest, JoinSessionResponse, ServerPacket, SessionInfo};
