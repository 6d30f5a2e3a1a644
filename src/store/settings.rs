//! Application settings as an explicit capability.
//!
//! The selector never reads ambient global state; components that depend on a
//! feature flag receive a `SettingsReader` and ask for a snapshot when they
//! need one.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Snapshot of the settings the selector cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// When on, swap's "to" slot holds its own selection instead of following
    /// home.
    pub swap_to_another_account_switch_on: bool,
}

/// Read access to the current settings snapshot.
#[async_trait::async_trait]
pub trait SettingsReader: Send + Sync {
    async fn settings(&self) -> AppSettings;
}

/// Mutable in-memory settings, shared via `Arc`.
#[derive(Default)]
pub struct InMemorySettings {
    inner: RwLock<AppSettings>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_swap_to_another_account_switch(&self, on: bool) {
        self.inner.write().await.swap_to_another_account_switch_on = on;
    }
}

#[async_trait::async_trait]
impl SettingsReader for InMemorySettings {
    async fn settings(&self) -> AppSettings {
        self.inner.read().await.clone()
    }
}
