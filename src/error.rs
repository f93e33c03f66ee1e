use thiserror::Error;

/// Raised when a mutation or replication entry point runs on the wrong side
/// of the authority split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("character {character_id} is not the authority")]
    NotAuthority { character_id: u32 },

    #[error("character {character_id} is authoritative and cannot take replicated values")]
    NotObserver { character_id: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session is full")]
    Full,

    #[error("Character {0} already exists")]
    CharacterExists(u32),

    #[error("Character {0} not found")]
    CharacterNotFound(u32),

    #[error("Character {0} is incapacitated and cannot move")]
    MovementLocked(u32),

    #[error("Character {0} is bound to a different address")]
    AddressMismatch(u32),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session {0} already exists")]
    SessionExists(String),

    #[error("Session limit of {0} reached")]
    TooManySessions(usize),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
