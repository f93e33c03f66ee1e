//! TPS gameplay server.
//!
//! One authoritative process owns every character's weapon, health and ammo.
//! Clients forward switch-weapon and fire requests, the authority applies
//! them inside a fixed-rate session tick, and field-level deltas are
//! replicated back to every observer over UDP.

pub mod client;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod tick;
pub mod utils;

pub use domain::dispatcher::{AuthorityLink, Dispatch, RequestedAction};
pub use domain::replication::PresentationHooks;
pub use error::{DispatchError, Result, ServerError, SessionError};
pub use state::character::{Character, CharacterState, Role};
