use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::game_mode::CharacterTemplate;
use crate::error::{Result, ServerError};

pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// Server configuration - immutable after load
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http_port: u16,
    pub udp_port: u16,
    pub tick_rate_hz: u32,
    pub snapshot_interval_ticks: u32,
    pub character_inactivity_timeout_secs: u64,
    pub max_sessions: usize,
    pub default_session: String,
    pub log_level: String,
    pub log_file: String,
    pub character: CharacterTemplate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            udp_port: 8081,
            tick_rate_hz: 50, // 20ms per tick
            snapshot_interval_ticks: 50, // full resync once a second
            character_inactivity_timeout_secs: 15,
            max_sessions: 1000,
            default_session: "test".to_string(),
            log_level: "debug".to_string(),
            log_file: "tpsserver.log".to_string(),
            character: CharacterTemplate::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a TOML file; missing keys fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| {
            ServerError::Config(format!("Failed to parse config file: {}", e))
        })?;

        if !(1..=MAX_TICK_RATE_HZ).contains(&config.tick_rate_hz) {
            return Err(ServerError::Config(format!(
                "tick_rate_hz must be between 1 and {}",
                MAX_TICK_RATE_HZ
            )));
        }

        Ok(config)
    }

    /// Tick period. Never zero, even for configs built in code.
    pub fn tick_interval(&self) -> Duration {
        let hz = self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ);
        Duration::from_micros(1_000_000 / hz as u64)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.udp_port, 8081);
        assert_eq!(config.tick_rate_hz, 50);
        assert_eq!(config.character.health, 100);
    }

    #[test]
    fn test_tick_interval() {
        let config = Config::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_tick_rate_upper_bound() {
        let result = Config::from_toml("tick_rate_hz = 2000");
        assert!(matches!(result, Err(ServerError::Config(_))));

        let config = Config::from_toml("tick_rate_hz = 1000").unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(1));

        // Out-of-range values set in code still give a usable period
        let config = Config { tick_rate_hz: 5000, ..Config::default() };
        assert!(!config.tick_interval().is_zero());
        let config = Config { tick_rate_hz: 0, ..Config::default() };
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            udp_port = 9000
            log_level = "warn"

            [character]
            rifle_ammo = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.udp_port, 9000);
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.log_level_filter(), log::LevelFilter::Warn);
        assert_eq!(config.character.rifle_ammo, 30);
        assert_eq!(config.character.pistol_ammo, 100);
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let result = Config::from_toml("tick_rate_hz = 0");
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }
}
