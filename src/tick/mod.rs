pub mod delta_sync;
pub mod session_tick;
