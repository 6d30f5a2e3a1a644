use crate::store::types::{
    DbAccount, DbDevice, DbIndexedAccount, DbWallet, DeriveInfo, DeriveInfoItem, DeriveType,
    NetworkAccount, NetworkInfo, VaultSettings, WalletId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named UI contexts that hold account selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneName {
    Home,
    Swap,
    Discover,
    Earn,
    Market,
}

impl std::fmt::Display for SceneName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SceneName::Home => "home",
            SceneName::Swap => "swap",
            SceneName::Discover => "discover",
            SceneName::Earn => "earn",
            SceneName::Market => "market",
        };
        f.write_str(name)
    }
}

/// Scene identity. Dapp-scoped scenes carry an opaque url that participates in
/// equality; two discover scenes with different urls hold independent
/// selections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId {
    pub name: SceneName,
    pub url: Option<String>,
}

impl SceneId {
    pub fn plain(name: SceneName) -> Self {
        Self { name, url: None }
    }

    pub fn with_url(name: SceneName, url: impl Into<String>) -> Self {
        Self {
            name,
            url: Some(url.into()),
        }
    }

    /// Stable key for persistence, safe to embed in a filename.
    pub fn storage_key(&self) -> String {
        match &self.url {
            None => self.name.to_string(),
            Some(url) => {
                let sanitized: String = url
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                    .collect();
                format!("{}__{}", self.name, sanitized)
            }
        }
    }
}

/// Wallet the selector UI is focused on: either a concrete wallet or the
/// virtual group of all "others" category wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusedWallet {
    Wallet(WalletId),
    OthersGroup,
}

/// A user's current choice in one (scene, slot) pair. Every field is optional;
/// the resolver copes with any combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectedAccount {
    pub wallet_id: Option<WalletId>,
    pub indexed_account_id: Option<String>,
    /// Loose account id for wallets without indexed-account structure.
    pub others_wallet_account_id: Option<String>,
    pub network_id: Option<String>,
    pub derive_type: Option<DeriveType>,
    pub focused_wallet: Option<FocusedWallet>,
}

/// Per-scene selections keyed by slot number.
pub type SelectedAccountsMap = BTreeMap<usize, SelectedAccount>;

/// Fully materialized, display-ready view of a selection. Derived fresh on
/// every resolution; never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveAccountInfo {
    pub account: Option<NetworkAccount>,
    /// Raw db record fallback when no network account could be materialized.
    pub db_account: Option<DbAccount>,
    pub all_network_db_accounts: Option<Vec<DbAccount>>,
    pub indexed_account: Option<DbIndexedAccount>,
    pub wallet: Option<DbWallet>,
    pub device: Option<DbDevice>,
    pub network: Option<NetworkInfo>,
    pub vault_settings: Option<VaultSettings>,
    pub derive_type: Option<DeriveType>,
    pub derive_info: Option<DeriveInfo>,
    pub derive_info_items: Vec<DeriveInfoItem>,
    pub account_name: String,
    /// False only on the default placeholder; the resolver always returns
    /// true.
    pub ready: bool,
    pub is_others_wallet: bool,
    pub can_create_address: bool,
    pub is_network_not_matched: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_equality_includes_url() {
        let plain = SceneId::plain(SceneName::Discover);
        let a = SceneId::with_url(SceneName::Discover, "https://app.example");
        let b = SceneId::with_url(SceneName::Discover, "https://app.example");
        let c = SceneId::with_url(SceneName::Discover, "https://other.example");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, plain);
    }

    #[test]
    fn storage_key_is_filename_safe() {
        let scene = SceneId::with_url(SceneName::Discover, "https://app.example/path");
        let key = scene.storage_key();
        assert!(key.starts_with("discover__"));
        assert!(!key.contains('/'));
        assert!(!key.contains(':'));
        assert_eq!(SceneId::plain(SceneName::Home).storage_key(), "home");
    }

    #[test]
    fn default_active_account_is_not_ready() {
        let info = ActiveAccountInfo::default();
        assert!(!info.ready);
        assert!(info.account.is_none());
        assert_eq!(info.account_name, "");
    }
}
