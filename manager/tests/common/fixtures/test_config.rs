//! Test configuration builder for creating test configs programmatically

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use action_manager::{Config, ConfigManager};

use super::test_data::{hosts, networks};

/// Builder for creating test configurations
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
    host_configs: Vec<HostConfigBuilder>,
}

impl TestConfigBuilder {
    /// Create a new test config builder
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
            host_configs: Vec::new(),
        }
    }

    /// One virtualization host with two networks and one plain minion
    pub fn standard() -> Self {
        Self::new()
            .with_host(hosts::HYPERVISOR_NAME, hosts::HYPERVISOR, |h| {
                h.api_key(hosts::HYPERVISOR_KEY)
                    .virtualization(true)
                    .network(networks::DEFAULT)
                    .network(networks::ISOLATED)
            })
            .with_host(hosts::MINION_NAME, hosts::MINION, |h| {
                h.api_key(hosts::MINION_KEY)
            })
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Add a managed host configuration
    pub fn with_host<F>(mut self, name: &str, id: i64, f: F) -> Self
    where
        F: FnOnce(HostConfigBuilder) -> HostConfigBuilder,
    {
        let builder = f(HostConfigBuilder::new(name, id));
        self.host_configs.push(builder);
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        let database_path = self.temp_dir.path().join("actions.db");
        let main_toml = self.main_config.to_toml(&database_path);
        fs::write(config_dir.join("main.toml"), main_toml).expect("Failed to write main.toml");

        for builder in self.host_configs {
            fs::write(
                config_dir.join(format!("{}.toml", builder.name)),
                builder.to_toml(),
            )
            .expect("Failed to write host config");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main configuration builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    host: String,
    port: u16,
    delivery_enabled: bool,
}

impl MainConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn delivery_enabled(mut self, enabled: bool) -> Self {
        self.delivery_enabled = enabled;
        self
    }

    fn to_toml(&self, database_path: &std::path::Path) -> String {
        format!(
            r#"
host = "{}"
port = {}
database_path = "{}"
delivery_enabled = {}
"#,
            self.host,
            self.port,
            database_path.display(),
            self.delivery_enabled
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8096,
            delivery_enabled: true,
        }
    }
}

/// Managed host configuration builder
pub struct HostConfigBuilder {
    name: String,
    id: i64,
    agent_host: String,
    agent_port: u16,
    api_key: String,
    virtualization_enabled: bool,
    networks: Vec<String>,
}

impl HostConfigBuilder {
    pub fn new(name: &str, id: i64) -> Self {
        Self {
            name: name.to_string(),
            id,
            agent_host: "127.0.0.1".to_string(),
            agent_port: 8745,
            api_key: "test-api-key".to_string(),
            virtualization_enabled: false,
            networks: Vec::new(),
        }
    }

    pub fn agent(mut self, host: &str, port: u16) -> Self {
        self.agent_host = host.to_string();
        self.agent_port = port;
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }

    pub fn virtualization(mut self, enabled: bool) -> Self {
        self.virtualization_enabled = enabled;
        self
    }

    pub fn network(mut self, name: &str) -> Self {
        self.networks.push(name.to_string());
        self
    }

    fn to_toml(&self) -> String {
        let networks = self
            .networks
            .iter()
            .map(|n| format!("\"{}\"", n))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"
[host]
id = {}
minion_id = "{}.example.test"
agent_host = "{}"
agent_port = {}
api_key = "{}"
virtualization_enabled = {}
networks = [{}]
"#,
            self.id,
            self.name,
            self.agent_host,
            self.agent_port,
            self.api_key,
            self.virtualization_enabled,
            networks
        )
    }
}

/// Config files on disk; removed when dropped
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn config_dir_str(&self) -> String {
        self.config_dir.to_string_lossy().to_string()
    }

    pub async fn load(&self) -> Arc<Config> {
        ConfigManager::new(self.config_dir_str())
            .await
            .expect("Failed to load test config")
            .get_current_config()
    }
}
