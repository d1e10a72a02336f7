pub mod manager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
pub use manager::ConfigManager;

use crate::constants::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// When false, created actions are persisted but never handed to agents
    #[serde(default = "default_delivery_enabled")]
    pub delivery_enabled: bool,
    // Populated from individual host config files, keyed by host id
    #[serde(skip)]
    pub hosts: HashMap<i64, HostConfig>,
}

impl Config {
    pub fn managed_host(&self, host_id: i64) -> Option<&HostConfig> {
        self.hosts.get(&host_id)
    }
}

/// One managed host, loaded from `<name>.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(skip)]
    pub name: String,
    pub id: i64,
    pub minion_id: String,
    pub agent_host: String,
    #[serde(default = "default_agent_port")]
    pub agent_port: u16,
    pub api_key: String,
    #[serde(default)]
    pub virtualization_enabled: bool,
    /// Virtual networks known to exist on the host at startup
    #[serde(default)]
    pub networks: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfigFile {
    pub host: HostConfig,
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_database_path() -> String {
    defaults::DATABASE_PATH.to_string()
}

fn default_delivery_enabled() -> bool {
    true
}

fn default_agent_port() -> u16 {
    defaults::AGENT_PORT
}
