//! External collaborator contracts and their reference implementations.
//!
//! The selector engine consumes account data, network metadata, vault
//! settings, persisted selections and feature flags exclusively through the
//! traits defined here. Each trait ships with an in-memory implementation for
//! tests and the demo wiring; the selection store additionally has a
//! file-backed implementation.

pub mod accounts;
pub mod networks;
pub mod selection;
pub mod settings;
pub mod types;

pub use accounts::{AccountStore, InMemoryAccountStore};
pub use networks::{InMemoryNetworkRegistry, NetworkRegistry, VaultSettingsProvider};
pub use selection::{FileSelectionRepository, InMemorySelectionRepository, SelectionRepository};
pub use settings::{AppSettings, InMemorySettings, SettingsReader};
pub use types::*;
