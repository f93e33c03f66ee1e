pub mod dispatcher;
pub mod game_mode;
pub mod replication;
pub mod sessions;
