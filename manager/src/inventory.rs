//! Virtual network inventory
//!
//! The manager's view of which virtual networks exist on each managed host.
//! Seeded from host configuration and kept current from successful network
//! results reported by agents:
//!
//! - a successful create adds the network
//! - a successful delete removes it
//!
//! State changes are validated against this view at dispatch time.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::actions::{ActionDetails, HostId, NetworkState};
use crate::config::Config;

#[derive(Clone, Default)]
pub struct NetworkInventory {
    networks: Arc<RwLock<HashMap<HostId, BTreeSet<String>>>>, // host_id -> network names
}

impl NetworkInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let networks = config
            .hosts
            .values()
            .map(|host| (host.id, host.networks.iter().cloned().collect()))
            .collect();
        Self {
            networks: Arc::new(RwLock::new(networks)),
        }
    }

    /// Sorted snapshot of one host's networks
    pub async fn networks(&self, host_id: HostId) -> BTreeSet<String> {
        let networks = self.networks.read().await;
        networks.get(&host_id).cloned().unwrap_or_default()
    }

    pub async fn contains(&self, host_id: HostId, network_name: &str) -> bool {
        let networks = self.networks.read().await;
        networks
            .get(&host_id)
            .is_some_and(|names| names.contains(network_name))
    }

    pub async fn add(&self, host_id: HostId, network_name: &str) {
        let mut networks = self.networks.write().await;
        if networks
            .entry(host_id)
            .or_default()
            .insert(network_name.to_string())
        {
            info!("Network {} now present on host {}", network_name, host_id);
        }
    }

    pub async fn remove(&self, host_id: HostId, network_name: &str) {
        let mut networks = self.networks.write().await;
        if let Some(names) = networks.get_mut(&host_id) {
            if names.remove(network_name) {
                info!("Network {} removed from host {}", network_name, host_id);
            }
        }
    }

    /// Applies a successful network result to the inventory
    pub async fn apply_success(&self, host_id: HostId, details: &ActionDetails) {
        match details {
            ActionDetails::NetworkCreate { network_name, .. } => {
                self.add(host_id, network_name).await
            }
            ActionDetails::NetworkStateChange {
                network_name,
                state: NetworkState::Delete,
            } => self.remove(host_id, network_name).await,
            _ => debug!("Result for host {} does not change inventory", host_id),
        }
    }
}
