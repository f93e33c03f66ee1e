pub mod character;
pub mod commands;
pub mod server_state;
pub mod session;
