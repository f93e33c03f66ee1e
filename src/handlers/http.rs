use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use crate::handlers::models::{
    CharacterInfo, CreateSessionRequest, DamageRequest, JoinSessionRequest, JoinSessionResponse, SessionInfo,
};
use crate::state::commands::SessionCommand;
use crate::state::server_state::ServerState;
use crate::state::session::Session;
use crate::domain::game_mode::GameMode;
use crate::domain::sessions;
use crate::error::{ServerError, SessionError};
use crate::utils::config::Config;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// App state for HTTP handlers (includes server state and dependencies)
#[derive(Clone)]
pub struct AppState {
    pub state: Arc<ServerState>,
    pub game_mode: Arc<GameMode>,
    pub config: Arc<Config>,
    pub udp_socket: Arc<UdpSocket>,
}

fn session_info(session: &Session, udp_port: u16) -> SessionInfo {
    SessionInfo {
        code: session.code.clone(),
        character_count: session.characters.len(),
        max_characters: session.max_characters,
        characters: session.characters.values().map(|c| CharacterInfo {
            id: c.id,
            name: c.name.clone(),
        }).collect(),
        udp_port,
        scene: session.scene.clone(),
    }
}

/// Thin HTTP handler: Create session
pub async fn create_session(
    State(app_state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionInfo>, StatusCode> {
    let max_characters = request.max_characters.unwrap_or(4);
    let scene = request.scene.unwrap_or_else(|| "world".to_string());

    // Create session and spawn tick loop
    if let Err(e) = crate::server::create_session_with_tick(
        app_state.state.clone(),
        request.code.clone(),
        max_characters,
        scene,
        app_state.game_mode.clone(),
        app_state.config.clone(),
        app_state.udp_socket.clone(),
    ) {
        log::warn!("Failed to create session {}: {}", request.code, e);
        return Err(match e {
            ServerError::SessionExists(_) => StatusCode::CONFLICT,
            ServerError::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        });
    }

    let session_arc = app_state.state.get_session(&request.code)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    let session = session_arc.read().await;
    Ok(Json(session_info(&session, app_state.config.udp_port)))
}

/// Thin HTTP handler: Join session
pub async fn join_session(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Json<JoinSessionResponse>, StatusCode> {
    let session_arc = app_state.state.get_session(&code)
        .ok_or(StatusCode::NOT_FOUND)?;

    let character_id = app_state.state.next_character_id();
    let character = app_state.game_mode.spawn_character(character_id, request.name);

    let mut session = session_arc.write().await;
    match sessions::add_character(&mut session, character) {
        Ok(()) => Ok(Json(JoinSessionResponse {
            session: session_info(&session, app_state.config.udp_port),
            character_id,
        })),
        Err(SessionError::Full) => Err(StatusCode::CONFLICT),
        Err(_) => Err(StatusCode::BAD_REQUEST),
    }
}

/// Thin HTTP handler: Get session info
pub async fn get_session(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SessionInfo>, StatusCode> {
    let session_arc = app_state.state.get_session(&code)
        .ok_or(StatusCode::NOT_FOUND)?;

    let session = session_arc.read().await;
    Ok(Json(session_info(&session, app_state.config.udp_port)))
}

/// Thin HTTP handler: Delete session and stop its tick loop
pub async fn delete_session(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> StatusCode {
    match app_state.state.remove_session(&code) {
        Some(_) => {
            log::info!("Removed session '{}'", code);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Thin HTTP handler: List all sessions
pub async fn list_sessions(
    State(app_state): State<AppState>,
) -> Json<Vec<SessionInfo>> {
    let mut infos = Vec::new();

    // Collect handles first so no DashMap guard is held across an await
    for code in app_state.state.session_codes() {
        if let Some(session_arc) = app_state.state.get_session(&code) {
            let session = session_arc.read().await;
            infos.push(session_info(&session, app_state.config.udp_port));
        }
    }

    Json(infos)
}

/// Authority-side damage. Enqueued so it is applied inside the tick like
/// every other mutation.
pub async fn damage_character(
    State(app_state): State<AppState>,
    Path((code, character_id)): Path<(String, u32)>,
    Json(request): Json<DamageRequest>,
) -> StatusCode {
    let Some(tx) = app_state.state.get_session_tx(&code) else {
        return StatusCode::NOT_FOUND;
    };

    let cmd = SessionCommand::TakeDamage { character_id, amount: request.amount };
    match tx.try_send(cmd) {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            log::warn!("Failed to enqueue damage for session {}: {}", code, e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
