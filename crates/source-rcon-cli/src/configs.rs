use std::fs::File;
use std::collections::HashMap;

use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub password: String,
    #[serde(default)]
    pub retries: Option<usize>,
    /// Seconds to wait before each reconnect attempt.
    #[serde(default)]
    pub retry_delay: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct ServerConfigMap {
    configs: HashMap<String, ServerConfig>,
}

pub const DEFAULT_PORT: u16 = 27015;
const ENV_VAR_KEY: &str = "RCON_CONFIG_PATH";

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn get_config_path_env_var() -> Option<String> {
    match std::env::var(ENV_VAR_KEY) {
        Ok(path) => {
            log::debug!("Found environment variable {}: {}", ENV_VAR_KEY, path);
            Some(path)
        },
        Err(_) => {
            log::warn!("Environment variable {} not set", ENV_VAR_KEY);
            None
        }
    }
}

pub fn load_config_from_env(config_name: Option<String>) -> Option<ServerConfig> {
    get_config_path_env_var().and_then(|path| load_config(&path, config_name))
}

fn load_config(config_file_path: &str, config_name: Option<String>) -> Option<ServerConfig> {
    let mut file = match File::open(config_file_path) {
        Ok(f) => f,
        Err(_) => {
            log::error!("Failed to open config file: {}", config_file_path);
            return None;
        }
    };

    let config: ServerConfigMap = match serde_json::from_reader(&mut file) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to parse config file {}: {}", config_file_path, e);
            return None;
        }
    };
    log::debug!("Loaded {} server profile(s) from {}", config.configs.len(), config_file_path);

    match config_name {
        Some(name) => match config.configs.get(&name) {
            Some(server_config) => {
                log::info!("Using config: {}", name);
                Some(server_config.clone())
            }
            None => {
                log::error!("Config with name '{}' not found in config file.", name);
                None
            }
        },
        None if config.configs.len() == 1 => {
            let (name, server_config) = config.configs.iter().next()?;
            log::info!("No config name provided. Using the only available config: {}", name);
            Some(server_config.clone())
        }
        None => {
            log::error!("No config name provided. Please specify a config name.");
            None
        }
    }
}
