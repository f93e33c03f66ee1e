use std::sync::Arc;
use tpsserver::domain::game_mode::GameMode;
use tpsserver::server;
use tpsserver::state::server_state::ServerState;
use tpsserver::utils::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load immutable globals (zero contention)
    let config = match std::env::var("TPS_CONFIG") {
        Ok(path) => Config::load(path)?,
        Err(_) => Config::default(),
    };
    setup_logging(&config)?;

    let config = Arc::new(config);
    let game_mode = Arc::new(GameMode::new(config.character.clone()));

    // Create server state (partitioned by session)
    let state = Arc::new(ServerState::new());

    // Shared UDP socket for all session tick loops
    let udp_socket = Arc::new(
        tokio::net::UdpSocket::bind(("0.0.0.0", config.udp_port)).await?
    );

    server::create_session_with_tick(
        state.clone(),
        config.default_session.clone(),
        8,
        "world".to_string(),
        game_mode.clone(),
        config.clone(),
        udp_socket.clone(),
    )?;

    server::start_servers(state, game_mode, config, udp_socket).await?;

    Ok(())
}

fn setup_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Utc::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(config.log_level_filter())
        .chain(std::io::stdout())
        .chain(fern::log_file(&config.log_file)?)
        .apply()?;
    Ok(())
}
