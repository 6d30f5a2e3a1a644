//! Network registry and vault settings contracts.
//!
//! The registry resolves network metadata and the per-network derive-type
//! options, and owns the network-scoped global derive type shared by scenes
//! that opt into it. Vault settings are a static per-network capability table
//! exposed through their own provider contract.

use crate::store::types::{
    DeriveInfo, DeriveInfoItem, DeriveType, NetworkInfo, SelectorError, VaultSettings,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Network metadata and derive-type resolution contract.
#[async_trait::async_trait]
pub trait NetworkRegistry: Send + Sync {
    async fn get_network(&self, network_id: &str) -> Result<NetworkInfo, SelectorError>;

    async fn get_derive_info_of_network(
        &self,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<DeriveInfo, SelectorError>;

    /// All selectable derive-type variants for a network. `None` yields an
    /// error so callers can degrade to an empty list.
    async fn get_derive_info_items_of_network(
        &self,
        network_id: Option<&str>,
    ) -> Result<Vec<DeriveInfoItem>, SelectorError>;

    async fn get_global_derive_type_of_network(
        &self,
        network_id: &str,
    ) -> Result<Option<DeriveType>, SelectorError>;

    async fn save_global_derive_type_for_network(
        &self,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<(), SelectorError>;
}

/// Per-network vault capability lookup.
#[async_trait::async_trait]
pub trait VaultSettingsProvider: Send + Sync {
    async fn get_vault_settings(&self, network_id: &str) -> Result<VaultSettings, SelectorError>;
}

#[derive(Default)]
struct NetworkRegistryInner {
    networks: HashMap<String, NetworkInfo>,
    vault_settings: HashMap<String, VaultSettings>,
    derive_infos: HashMap<(String, String), DeriveInfo>,
    derive_info_items: HashMap<String, Vec<DeriveInfoItem>>,
    global_derive_types: HashMap<String, DeriveType>,
}

/// In-memory registry implementing both the network and vault settings
/// contracts.
#[derive(Default)]
pub struct InMemoryNetworkRegistry {
    inner: RwLock<NetworkRegistryInner>,
}

impl InMemoryNetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_network(&self, network: NetworkInfo) {
        self.inner
            .write()
            .await
            .networks
            .insert(network.id.clone(), network);
    }

    pub async fn set_vault_settings(&self, settings: VaultSettings) {
        self.inner
            .write()
            .await
            .vault_settings
            .insert(settings.network_id.clone(), settings);
    }

    pub async fn add_derive_info(
        &self,
        network_id: &str,
        derive_type: DeriveType,
        info: DeriveInfo,
        label: &str,
    ) {
        let mut inner = self.inner.write().await;
        inner.derive_infos.insert(
            (network_id.to_string(), derive_type.as_str().to_string()),
            info.clone(),
        );
        inner
            .derive_info_items
            .entry(network_id.to_string())
            .or_default()
            .push(DeriveInfoItem {
                value: derive_type,
                label: label.to_string(),
                item: info,
            });
    }
}

#[async_trait::async_trait]
impl NetworkRegistry for InMemoryNetworkRegistry {
    async fn get_network(&self, network_id: &str) -> Result<NetworkInfo, SelectorError> {
        self.inner
            .read()
            .await
            .networks
            .get(network_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("network", network_id))
    }

    async fn get_derive_info_of_network(
        &self,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<DeriveInfo, SelectorError> {
        self.inner
            .read()
            .await
            .derive_infos
            .get(&(network_id.to_string(), derive_type.as_str().to_string()))
            .cloned()
            .ok_or_else(|| {
                SelectorError::not_found("derive info", format!("{network_id}/{derive_type}"))
            })
    }

    async fn get_derive_info_items_of_network(
        &self,
        network_id: Option<&str>,
    ) -> Result<Vec<DeriveInfoItem>, SelectorError> {
        let network_id =
            network_id.ok_or_else(|| SelectorError::not_found("network", "<unset>"))?;
        Ok(self
            .inner
            .read()
            .await
            .derive_info_items
            .get(network_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_global_derive_type_of_network(
        &self,
        network_id: &str,
    ) -> Result<Option<DeriveType>, SelectorError> {
        Ok(self
            .inner
            .read()
            .await
            .global_derive_types
            .get(network_id)
            .cloned())
    }

    async fn save_global_derive_type_for_network(
        &self,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<(), SelectorError> {
        debug!("saving global derive type {derive_type} for {network_id}");
        self.inner
            .write()
            .await
            .global_derive_types
            .insert(network_id.to_string(), derive_type.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl VaultSettingsProvider for InMemoryNetworkRegistry {
    async fn get_vault_settings(&self, network_id: &str) -> Result<VaultSettings, SelectorError> {
        self.inner
            .read()
            .await
            .vault_settings
            .get(network_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("vault settings", network_id))
    }
}
