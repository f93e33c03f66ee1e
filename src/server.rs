use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use log::info;
use tokio::net::{TcpListener, UdpSocket};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use crate::domain::game_mode::GameMode;
use crate::error::{Result, ServerError};
use crate::state::commands::SessionCommand;
use crate::state::server_state::{ServerState, SessionHandle};
use crate::state::session::Session;
use crate::handlers::http::{
    create_session, damage_character, delete_session, get_session, join_session, list_sessions, AppState,
};
use crate::handlers::udp::handle_udp_packet;
use crate::tick::session_tick::session_tick_loop;
use crate::utils::config::Config;

/// Start HTTP and UDP servers
pub async fn start_servers(
    state: Arc<ServerState>,
    game_mode: Arc<GameMode>,
    config: Arc<Config>,
    udp_socket: Arc<UdpSocket>,
) -> Result<()> {
    let app_state = AppState {
        state: state.clone(),
        game_mode,
        config: config.clone(),
        udp_socket: udp_socket.clone(),
    };

    let listener = TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("HTTP server bound to {}", listener.local_addr()?);

    let http_server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(app_state)).await {
            log::error!("HTTP server error: {}", e);
        }
    });
    let udp_server = init_udp_server(state, udp_socket);

    tokio::try_join!(http_server, udp_server)
        .map_err(|e| ServerError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
    Ok(())
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:code/join", post(join_session))
        .route("/sessions/:code", get(get_session))
        .route("/sessions/:code", delete(delete_session))
        .route("/sessions/:code/characters/:id/damage", post(damage_character))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Initialize UDP server
fn init_udp_server(
    state: Arc<ServerState>,
    socket: Arc<UdpSocket>,
) -> tokio::task::JoinHandle<()> {
    if let Ok(addr) = socket.local_addr() {
        info!("UDP server listening on {}", addr);
    }

    tokio::spawn(async move {
        let mut buf = [0u8; 1024];

        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, addr)) => {
                    let data = &buf[..len];
                    match serde_json::from_slice::<serde_json::Value>(data) {
                        Ok(packet) => handle_udp_packet(packet, addr, &state).await,
                        Err(e) => log::debug!("Invalid JSON from {}: {}", addr, e),
                    }
                }
                Err(e) => {
                    log::error!("UDP recv error: {}", e);
                }
            }
        }
    })
}

/// Create a new session and spawn its tick loop
pub fn create_session_with_tick(
    state: Arc<ServerState>,
    code: String,
    max_characters: u32,
    scene: String,
    game_mode: Arc<GameMode>,
    config: Arc<Config>,
    socket: Arc<UdpSocket>,
) -> Result<()> {
    if state.session_count() >= config.max_sessions {
        return Err(ServerError::TooManySessions(config.max_sessions));
    }

    // The tick task is only spawned once the code is known to be free
    let inserted = state.try_insert_session(code.clone(), || {
        let session = Arc::new(RwLock::new(Session::new(code.clone(), max_characters, scene)));
        let (tx, rx) = mpsc::channel::<SessionCommand>(1000);

        let tick_session = session.clone();
        let task_handle = tokio::spawn(async move {
            session_tick_loop(tick_session, rx, socket, game_mode, config).await;
        });

        SessionHandle {
            session,
            command_tx: tx,
            task_handle,
        }
    });

    if !inserted {
        return Err(ServerError::SessionExists(code));
    }

    info!("Created session '{}'", code);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_session_twice() {
        let state = Arc::new(ServerState::new());
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let config = Arc::new(Config::default());
        let mode = Arc::new(GameMode::default());

        create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode.clone(), config.clone(), socket.clone()).unwrap();
        let result = create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode, config, socket);

        assert!(matches!(result, Err(ServerError::SessionExists(code)) if code == "A"));
        assert_eq!(state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let state = Arc::new(ServerState::new());
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let config = Arc::new(Config { max_sessions: 1, ..Config::default() });
        let mode = Arc::new(GameMode::default());

        create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode.clone(), config.clone(), socket.clone()).unwrap();
        let result = create_session_with_tick(state, "B".to_string(), 4, "world".to_string(), mode, config, socket);

        assert!(matches!(result, Err(ServerError::TooManySessions(1))));
    }

    #[tokio::test]
    async fn test_removed_session_frees_slot_and_stops_tick() {
        let state = Arc::new(ServerState::new());
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let config = Arc::new(Config { max_sessions: 1, ..Config::default() });
        let mode = Arc::new(GameMode::default());

        create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode.clone(), config.clone(), socket.clone()).unwrap();
        let tx = state.get_session_tx("A").unwrap();

        assert!(state.remove_session("A").is_some());
        // The aborted tick task drops its receiver
        tokio::time::timeout(std::time::Duration::from_secs(1), tx.closed()).await.unwrap();

        create_session_with_tick(state.clone(), "B".to_string(), 4, "world".to_string(), mode, config, socket).unwrap();
        assert_eq!(state.session_codes(), vec!["B".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_keeps_first_tick_running() {
        let state = Arc::new(ServerState::new());
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let config = Arc::new(Config::default());
        let mode = Arc::new(GameMode::default());

        create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode.clone(), config.clone(), socket.clone()).unwrap();
        let tx = state.get_session_tx("A").unwrap();
        assert!(create_session_with_tick(state.clone(), "A".to_string(), 4, "world".to_string(), mode, config, socket).is_err());

        tokio::task::yield_now().await;
        assert!(!tx.is_closed());
        assert!(tx.same_channel(&state.get_session_tx("A").unwrap()));
    }
}
