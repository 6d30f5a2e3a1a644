//! Account store contract consumed by the selector engine.
//!
//! The selector never owns account data; it reads wallets, indexed accounts,
//! concrete network accounts and devices through the `AccountStore` trait.
//! `InMemoryAccountStore` is the reference implementation used by the demo
//! wiring and the module tests.

use crate::store::types::{
    DbAccount, DbDevice, DbIndexedAccount, DbWallet, DeriveType, NetworkAccount, SelectorError,
    WalletId, is_account_compatible_with_network, is_all_network,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Read/lookup contract over the wallet database.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn get_wallet(&self, wallet_id: &WalletId) -> Result<DbWallet, SelectorError>;

    async fn get_indexed_account(&self, id: &str) -> Result<DbIndexedAccount, SelectorError>;

    /// Resolve the concrete db-account id derived from an indexed account for
    /// one (network, derive type) pair.
    async fn get_db_account_id_from_indexed_account_id(
        &self,
        indexed_account_id: &str,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<String, SelectorError>;

    /// Fetch the network account for either an indexed account (HD/HW path)
    /// or a loose others-wallet account id. Incompatibility with the network
    /// is reported as an error and tolerated by callers.
    async fn get_network_account(
        &self,
        indexed_account_id: Option<&str>,
        account_id: Option<&str>,
        network_id: &str,
        derive_type: Option<&DeriveType>,
    ) -> Result<NetworkAccount, SelectorError>;

    async fn get_db_account(&self, account_id: &str) -> Result<DbAccount, SelectorError>;

    async fn get_device(&self, db_device_id: &str) -> Result<DbDevice, SelectorError>;

    /// Temporary wallets can be flagged removed while their rows still exist.
    async fn is_temp_wallet_removed(&self, wallet: &DbWallet) -> Result<bool, SelectorError>;

    /// All db accounts visible under the all-networks aggregate for the given
    /// indexed account or others-wallet account.
    async fn get_all_network_db_accounts(
        &self,
        network_id: &str,
        indexed_account_id: Option<&str>,
        others_wallet_account_id: Option<&str>,
    ) -> Result<Vec<DbAccount>, SelectorError>;

    /// Synthetic account standing in for an indexed account under the
    /// all-networks aggregate.
    async fn get_mocked_all_network_account(
        &self,
        indexed_account_id: &str,
    ) -> Result<NetworkAccount, SelectorError>;

    async fn get_singleton_accounts_of_wallet(
        &self,
        wallet_id: &WalletId,
        active_network_id: Option<&str>,
    ) -> Result<Vec<DbAccount>, SelectorError>;

    async fn get_indexed_accounts_of_wallet(
        &self,
        wallet_id: &WalletId,
    ) -> Result<Vec<DbIndexedAccount>, SelectorError>;
}

#[derive(Default)]
struct AccountStoreInner {
    wallets: HashMap<WalletId, DbWallet>,
    removed_temp_wallets: HashSet<WalletId>,
    indexed_accounts: HashMap<String, DbIndexedAccount>,
    db_accounts: HashMap<String, DbAccount>,
    /// (indexed account id, network id, derive type) -> db account id
    derived_account_ids: HashMap<(String, String, String), String>,
    /// (owner account id, network id) -> materialized network account
    network_accounts: HashMap<(String, String), NetworkAccount>,
    mocked_all_network_accounts: HashMap<String, NetworkAccount>,
    devices: HashMap<String, DbDevice>,
}

/// In-memory account store backed by plain maps.
#[derive(Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<AccountStoreInner>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_wallet(&self, wallet: DbWallet) {
        self.inner
            .write()
            .await
            .wallets
            .insert(wallet.id.clone(), wallet);
    }

    pub async fn mark_temp_wallet_removed(&self, wallet_id: &WalletId) {
        self.inner
            .write()
            .await
            .removed_temp_wallets
            .insert(wallet_id.clone());
    }

    pub async fn add_indexed_account(&self, account: DbIndexedAccount) {
        self.inner
            .write()
            .await
            .indexed_accounts
            .insert(account.id.clone(), account);
    }

    pub async fn add_db_account(&self, account: DbAccount) {
        self.inner
            .write()
            .await
            .db_accounts
            .insert(account.id.clone(), account);
    }

    pub async fn add_device(&self, device: DbDevice) {
        self.inner
            .write()
            .await
            .devices
            .insert(device.id.clone(), device);
    }

    /// Record that deriving `indexed_account_id` on (network, derive type)
    /// yields the db account `db_account_id`.
    pub async fn link_derived_account(
        &self,
        indexed_account_id: &str,
        network_id: &str,
        derive_type: &DeriveType,
        db_account_id: &str,
    ) {
        self.inner.write().await.derived_account_ids.insert(
            (
                indexed_account_id.to_string(),
                network_id.to_string(),
                derive_type.as_str().to_string(),
            ),
            db_account_id.to_string(),
        );
    }

    /// Register the materialized network account for an owner account id on a
    /// network.
    pub async fn insert_network_account(
        &self,
        owner_account_id: &str,
        network_id: &str,
        account: NetworkAccount,
    ) {
        self.inner.write().await.network_accounts.insert(
            (owner_account_id.to_string(), network_id.to_string()),
            account,
        );
    }

    pub async fn set_mocked_all_network_account(
        &self,
        indexed_account_id: &str,
        account: NetworkAccount,
    ) {
        self.inner
            .write()
            .await
            .mocked_all_network_accounts
            .insert(indexed_account_id.to_string(), account);
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get_wallet(&self, wallet_id: &WalletId) -> Result<DbWallet, SelectorError> {
        self.inner
            .read()
            .await
            .wallets
            .get(wallet_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("wallet", wallet_id.as_str()))
    }

    async fn get_indexed_account(&self, id: &str) -> Result<DbIndexedAccount, SelectorError> {
        self.inner
            .read()
            .await
            .indexed_accounts
            .get(id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("indexed account", id))
    }

    async fn get_db_account_id_from_indexed_account_id(
        &self,
        indexed_account_id: &str,
        network_id: &str,
        derive_type: &DeriveType,
    ) -> Result<String, SelectorError> {
        self.inner
            .read()
            .await
            .derived_account_ids
            .get(&(
                indexed_account_id.to_string(),
                network_id.to_string(),
                derive_type.as_str().to_string(),
            ))
            .cloned()
            .ok_or_else(|| SelectorError::not_found("derived account id", indexed_account_id))
    }

    async fn get_network_account(
        &self,
        indexed_account_id: Option<&str>,
        account_id: Option<&str>,
        network_id: &str,
        derive_type: Option<&DeriveType>,
    ) -> Result<NetworkAccount, SelectorError> {
        let inner = self.inner.read().await;

        // Others-wallet path: the loose account id is the owner.
        if let Some(account_id) = account_id {
            return inner
                .network_accounts
                .get(&(account_id.to_string(), network_id.to_string()))
                .cloned()
                .ok_or_else(|| {
                    SelectorError::Incompatible(format!(
                        "account {account_id} has no presence on network {network_id}"
                    ))
                });
        }

        // HD/HW path: derive the owner account id first.
        let indexed_account_id = indexed_account_id
            .ok_or_else(|| SelectorError::not_found("indexed account id", network_id))?;
        let derive_type = derive_type.ok_or_else(|| {
            SelectorError::StoreError("derive type required for indexed account".to_string())
        })?;
        let owner_id = inner
            .derived_account_ids
            .get(&(
                indexed_account_id.to_string(),
                network_id.to_string(),
                derive_type.as_str().to_string(),
            ))
            .ok_or_else(|| {
                SelectorError::Incompatible(format!(
                    "indexed account {indexed_account_id} not derived on network {network_id}"
                ))
            })?;

        inner
            .network_accounts
            .get(&(owner_id.clone(), network_id.to_string()))
            .cloned()
            .ok_or_else(|| SelectorError::not_found("network account", owner_id.clone()))
    }

    async fn get_db_account(&self, account_id: &str) -> Result<DbAccount, SelectorError> {
        self.inner
            .read()
            .await
            .db_accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("db account", account_id))
    }

    async fn get_device(&self, db_device_id: &str) -> Result<DbDevice, SelectorError> {
        self.inner
            .read()
            .await
            .devices
            .get(db_device_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("device", db_device_id))
    }

    async fn is_temp_wallet_removed(&self, wallet: &DbWallet) -> Result<bool, SelectorError> {
        if !wallet.is_temp {
            return Ok(false);
        }
        Ok(self
            .inner
            .read()
            .await
            .removed_temp_wallets
            .contains(&wallet.id))
    }

    async fn get_all_network_db_accounts(
        &self,
        network_id: &str,
        indexed_account_id: Option<&str>,
        others_wallet_account_id: Option<&str>,
    ) -> Result<Vec<DbAccount>, SelectorError> {
        if !is_all_network(network_id) {
            return Err(SelectorError::StoreError(format!(
                "{network_id} is not the all-networks aggregate"
            )));
        }
        let inner = self.inner.read().await;
        let mut accounts: Vec<DbAccount> = inner
            .db_accounts
            .values()
            .filter(|account| {
                if let Some(indexed_account_id) = indexed_account_id {
                    account.indexed_account_id.as_deref() == Some(indexed_account_id)
                } else if let Some(others_id) = others_wallet_account_id {
                    account.id == others_id
                } else {
                    false
                }
            })
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    async fn get_mocked_all_network_account(
        &self,
        indexed_account_id: &str,
    ) -> Result<NetworkAccount, SelectorError> {
        self.inner
            .read()
            .await
            .mocked_all_network_accounts
            .get(indexed_account_id)
            .cloned()
            .ok_or_else(|| SelectorError::not_found("all-network account", indexed_account_id))
    }

    async fn get_singleton_accounts_of_wallet(
        &self,
        wallet_id: &WalletId,
        active_network_id: Option<&str>,
    ) -> Result<Vec<DbAccount>, SelectorError> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<DbAccount> = inner
            .db_accounts
            .values()
            .filter(|account| account.wallet_id.as_ref() == Some(wallet_id))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        // Surface accounts usable on the active network first.
        if let Some(network_id) = active_network_id {
            accounts.sort_by_key(|account| !is_account_compatible_with_network(account, network_id));
        }
        Ok(accounts)
    }

    async fn get_indexed_accounts_of_wallet(
        &self,
        wallet_id: &WalletId,
    ) -> Result<Vec<DbIndexedAccount>, SelectorError> {
        let inner = self.inner.read().await;
        let mut accounts: Vec<DbIndexedAccount> = inner
            .indexed_accounts
            .values()
            .filter(|account| &account.wallet_id == wallet_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|account| account.index);
        Ok(accounts)
    }
}
