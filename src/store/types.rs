use serde::{Deserialize, Serialize};

/// Synthetic network id representing the aggregate view across all networks.
pub const NETWORK_ID_ALL: &str = "all--0";

/// Singleton wallet ids for the non-HD wallet categories. These wallets hold
/// loose accounts directly instead of indexed accounts.
pub const WALLET_ID_IMPORTED: &str = "imported";
pub const WALLET_ID_WATCHING: &str = "watching";
pub const WALLET_ID_EXTERNAL: &str = "external";

const WALLET_PREFIX_HD: &str = "hd-";
const WALLET_PREFIX_HW: &str = "hw-";
const WALLET_PREFIX_QR: &str = "qr-";

/// Wallet category. Never stored alongside the wallet; always derived from the
/// wallet id itself, which encodes the category by convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletKind {
    /// Hierarchical-deterministic software wallet (`hd-*`).
    Hd,
    /// Hardware wallet (`hw-*`).
    Hardware,
    /// Air-gapped QR-code wallet (`qr-*`).
    Qr,
    /// Singleton wallet holding private-key imported accounts.
    Imported,
    /// Singleton wallet holding watch-only accounts.
    Watching,
    /// Singleton wallet holding externally connected accounts.
    External,
    /// Id that matches no known convention.
    Unknown,
}

impl WalletKind {
    /// The "others" categories lack indexed-account structure.
    pub fn is_others(&self) -> bool {
        matches!(
            self,
            WalletKind::Imported | WalletKind::Watching | WalletKind::External
        )
    }
}

/// Typed wallet identity. The category is part of the identity encoding, so
/// classification is a pure function of the id string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(String);

impl WalletId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classify the wallet by its identity encoding alone.
    pub fn kind(&self) -> WalletKind {
        match self.0.as_str() {
            WALLET_ID_IMPORTED => WalletKind::Imported,
            WALLET_ID_WATCHING => WalletKind::Watching,
            WALLET_ID_EXTERNAL => WalletKind::External,
            id if id.starts_with(WALLET_PREFIX_HD) => WalletKind::Hd,
            id if id.starts_with(WALLET_PREFIX_HW) => WalletKind::Hardware,
            id if id.starts_with(WALLET_PREFIX_QR) => WalletKind::Qr,
            _ => WalletKind::Unknown,
        }
    }

    pub fn is_others(&self) -> bool {
        self.kind().is_others()
    }

    pub fn is_hd(&self) -> bool {
        self.kind() == WalletKind::Hd
    }

    pub fn is_hw(&self) -> bool {
        self.kind() == WalletKind::Hardware
    }

    pub fn is_qr(&self) -> bool {
        self.kind() == WalletKind::Qr
    }
}

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Key-derivation path variant selector for a network. Open-ended because the
/// registry defines the available variants per network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeriveType(String);

impl DeriveType {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeriveType {
    /// The literal sentinel used when no explicit variant is selected.
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl std::fmt::Display for DeriveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wallet record as stored in the local database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbWallet {
    pub id: WalletId,
    pub name: String,
    /// Device backing this wallet, present for hardware and QR wallets.
    pub associated_device: Option<String>,
    /// Temporary wallets can be marked removed without deleting their rows.
    pub is_temp: bool,
}

/// Raw database-level account record. Serves as the display fallback when no
/// network account can be materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbAccount {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Chain implementation this account was created for (e.g. `evm`, `btc`).
    pub impl_coin: String,
    pub wallet_id: Option<WalletId>,
    pub indexed_account_id: Option<String>,
}

/// Wallet-scoped logical account, not yet bound to a network/derive path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbIndexedAccount {
    pub id: String,
    pub wallet_id: WalletId,
    pub name: String,
    pub index: u32,
    /// Concrete network account attached by list builders when a linked
    /// network is requested. Never persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub associate_account: Option<NetworkAccount>,
}

/// Account materialized for one (network, derive type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkAccount {
    pub id: String,
    pub name: String,
    /// Absent until an address has been created on the network.
    pub address: Option<String>,
    pub impl_coin: String,
}

impl NetworkAccount {
    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// Hardware device record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbDevice {
    pub id: String,
    pub name: String,
}

/// Network metadata from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
}

/// Per-network vault capabilities relevant to account creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultSettings {
    pub network_id: String,
    /// Whether QR wallets may create addresses on this network.
    pub qr_account_enabled: bool,
}

/// Descriptor for one derive-type variant of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveInfo {
    pub name_prefix: String,
    pub template: String,
    pub label: Option<String>,
}

/// Selectable derive-type entry for the selector UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeriveInfoItem {
    pub value: DeriveType,
    pub label: String,
    pub item: DeriveInfo,
}

/// Returns true when the network id denotes the all-networks aggregate.
pub fn is_all_network(network_id: &str) -> bool {
    network_id == NETWORK_ID_ALL
}

/// Chain implementation segment of a network id (`evm--1` -> `evm`).
pub fn network_impl(network_id: &str) -> &str {
    network_id.split("--").next().unwrap_or(network_id)
}

/// An account can only live on networks of the implementation it was created
/// for.
pub fn is_account_compatible_with_network(account: &DbAccount, network_id: &str) -> bool {
    account.impl_coin == network_impl(network_id)
}

/// Errors surfaced by the selector stores and registries
#[derive(Debug, thiserror::Error)]
pub enum SelectorError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("account not compatible: {0}")]
    Incompatible(String),

    #[error("store error: {0}")]
    StoreError(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SelectorError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_kind_is_derived_from_identity() {
        assert_eq!(WalletId::new("hd-1").kind(), WalletKind::Hd);
        assert_eq!(WalletId::new("hw-abc").kind(), WalletKind::Hardware);
        assert_eq!(WalletId::new("qr-xyz").kind(), WalletKind::Qr);
        assert_eq!(WalletId::new("imported").kind(), WalletKind::Imported);
        assert_eq!(WalletId::new("watching").kind(), WalletKind::Watching);
        assert_eq!(WalletId::new("external").kind(), WalletKind::External);
        assert_eq!(WalletId::new("something-else").kind(), WalletKind::Unknown);
    }

    #[test]
    fn others_classification_covers_singleton_wallets_only() {
        assert!(WalletId::new("imported").is_others());
        assert!(WalletId::new("watching").is_others());
        assert!(WalletId::new("external").is_others());
        assert!(!WalletId::new("hd-1").is_others());
        assert!(!WalletId::new("hw-1").is_others());
        assert!(!WalletId::new("qr-1").is_others());
    }

    #[test]
    fn network_impl_splits_on_separator() {
        assert_eq!(network_impl("evm--1"), "evm");
        assert_eq!(network_impl("btc--0"), "btc");
        assert_eq!(network_impl("plain"), "plain");
        assert!(is_all_network(NETWORK_ID_ALL));
        assert!(!is_all_network("evm--1"));
    }

    #[test]
    fn account_network_compatibility() {
        let account = DbAccount {
            id: "acc-1".to_string(),
            name: "Account 1".to_string(),
            address: "0xabc".to_string(),
            impl_coin: "evm".to_string(),
            wallet_id: Some(WalletId::new("imported")),
            indexed_account_id: None,
        };
        assert!(is_account_compatible_with_network(&account, "evm--1"));
        assert!(is_account_compatible_with_network(&account, "evm--137"));
        assert!(!is_account_compatible_with_network(&account, "btc--0"));
    }
}
