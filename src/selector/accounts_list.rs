//! Selector list building.
//!
//! Groups accounts into display sections by wallet category for the selector
//! UI. The "$$others" virtual focus yields one section per singleton wallet;
//! a concrete wallet yields its own accounts, optionally linked to their
//! materialized network accounts.

use crate::selector::types::FocusedWallet;
use crate::store::accounts::AccountStore;
use crate::store::types::{
    DbAccount, DbDevice, DbIndexedAccount, DbWallet, DeriveType, SelectorError,
    WALLET_ID_EXTERNAL, WALLET_ID_IMPORTED, WALLET_ID_WATCHING, WalletId, WalletKind,
    is_account_compatible_with_network,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// One row of a selector section: either a loose db account (others wallets)
/// or an indexed account (HD/HW wallets).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountsListItem {
    Db(DbAccount),
    Indexed(DbIndexedAccount),
}

impl AccountsListItem {
    pub fn id(&self) -> &str {
        match self {
            AccountsListItem::Db(account) => &account.id,
            AccountsListItem::Indexed(account) => &account.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            AccountsListItem::Db(account) => &account.name,
            AccountsListItem::Indexed(account) => &account.name,
        }
    }
}

/// Display section grouping the accounts of one wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsListSection {
    pub title: String,
    pub wallet_id: WalletId,
    pub data: Vec<AccountsListItem>,
    pub first_account: Option<AccountsListItem>,
    pub empty_text: String,
}

/// Wallet and device backing the focused wallet, when it still exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusedWalletInfo {
    pub wallet: DbWallet,
    pub device: Option<DbDevice>,
}

/// Complete payload for the selector list UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsListData {
    pub section_data: Vec<AccountsListSection>,
    pub focused_wallet_info: Option<FocusedWalletInfo>,
    pub accounts_count: usize,
}

/// Builds selector list sections from the account store.
pub struct AccountsListBuilder {
    accounts: Arc<dyn AccountStore>,
}

impl AccountsListBuilder {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    fn build_section(
        wallet_id: WalletId,
        data: Vec<AccountsListItem>,
        title: Option<String>,
    ) -> AccountsListSection {
        let (default_title, empty_text) = match wallet_id.kind() {
            WalletKind::Watching => ("Watched", "No watched accounts yet"),
            WalletKind::Imported => ("Private key", "No private key accounts yet"),
            WalletKind::External => ("Connected", "No connected external wallets"),
            _ => ("", "No accounts"),
        };
        AccountsListSection {
            title: title.unwrap_or_else(|| default_title.to_string()),
            first_account: data.first().cloned(),
            data,
            wallet_id,
            empty_text: empty_text.to_string(),
        }
    }

    /// Build the grouped sections for the focused wallet. A missing wallet is
    /// tolerated and yields no sections.
    pub async fn get_accounts_list_section_data(
        &self,
        focused_wallet: Option<&FocusedWallet>,
        others_network_id: Option<&str>,
        linked_network_id: Option<&str>,
        derive_type: &DeriveType,
    ) -> Result<Vec<AccountsListSection>, SelectorError> {
        let Some(focused_wallet) = focused_wallet else {
            return Ok(Vec::new());
        };

        if matches!(focused_wallet, FocusedWallet::OthersGroup) {
            let mut sections = Vec::new();
            for wallet_id in [WALLET_ID_IMPORTED, WALLET_ID_WATCHING, WALLET_ID_EXTERNAL] {
                let wallet_id = WalletId::new(wallet_id);
                let accounts = self
                    .accounts
                    .get_singleton_accounts_of_wallet(&wallet_id, others_network_id)
                    .await?;
                let data = accounts.into_iter().map(AccountsListItem::Db).collect();
                sections.push(Self::build_section(wallet_id, data, None));
            }
            return Ok(sections);
        }

        let FocusedWallet::Wallet(wallet_id) = focused_wallet else {
            return Ok(Vec::new());
        };

        // The wallet may have been removed since the focus was persisted.
        if let Err(e) = self.accounts.get_wallet(wallet_id).await {
            warn!("focused wallet unavailable: {e}");
            return Ok(Vec::new());
        }

        if wallet_id.is_others() {
            let mut accounts = self
                .accounts
                .get_singleton_accounts_of_wallet(wallet_id, others_network_id)
                .await?;
            if let Some(linked_network_id) = linked_network_id {
                accounts
                    .retain(|account| is_account_compatible_with_network(account, linked_network_id));
            }
            let data = accounts.into_iter().map(AccountsListItem::Db).collect();
            return Ok(vec![Self::build_section(
                wallet_id.clone(),
                data,
                Some(String::new()),
            )]);
        }

        // HD/HW wallet: list indexed accounts, linking each to its concrete
        // network account when a linked network is requested.
        let accounts = self
            .accounts
            .get_indexed_accounts_of_wallet(wallet_id)
            .await?;
        let accounts = if let Some(linked_network_id) = linked_network_id {
            let linked = accounts.into_iter().map(|mut indexed| async move {
                match self
                    .accounts
                    .get_network_account(
                        Some(&indexed.id),
                        None,
                        linked_network_id,
                        Some(derive_type),
                    )
                    .await
                {
                    Ok(real_account) => indexed.associate_account = Some(real_account),
                    Err(e) => debug!("no linked account for {}: {e}", indexed.id),
                }
                indexed
            });
            join_all(linked).await
        } else {
            accounts
        };

        let data = accounts.into_iter().map(AccountsListItem::Indexed).collect();
        Ok(vec![Self::build_section(
            wallet_id.clone(),
            data,
            Some(String::new()),
        )])
    }

    /// Wallet and device info for the focused wallet; `None` when the focus
    /// is the others group or the wallet no longer exists.
    pub async fn get_focused_wallet_info(
        &self,
        focused_wallet: Option<&FocusedWallet>,
    ) -> Option<FocusedWalletInfo> {
        let FocusedWallet::Wallet(wallet_id) = focused_wallet? else {
            return None;
        };

        let wallet = match self.accounts.get_wallet(wallet_id).await {
            Ok(wallet) => wallet,
            Err(e) => {
                warn!("focused wallet unavailable: {e}");
                return None;
            }
        };

        let mut device = None;
        if wallet_id.is_hw() {
            if let Some(device_id) = wallet.associated_device.clone() {
                device = self.accounts.get_device(&device_id).await.ok();
            }
        }

        Some(FocusedWalletInfo { wallet, device })
    }

    /// Sections plus focused-wallet info and the total account count.
    pub async fn build_accounts_list_data(
        &self,
        focused_wallet: Option<&FocusedWallet>,
        others_network_id: Option<&str>,
        linked_network_id: Option<&str>,
        derive_type: &DeriveType,
    ) -> Result<AccountsListData, SelectorError> {
        let section_data = self
            .get_accounts_list_section_data(
                focused_wallet,
                others_network_id,
                linked_network_id,
                derive_type,
            )
            .await?;
        let focused_wallet_info = self.get_focused_wallet_info(focused_wallet).await;
        let accounts_count = section_data.iter().map(|section| section.data.len()).sum();

        Ok(AccountsListData {
            section_data,
            focused_wallet_info,
            accounts_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::accounts::InMemoryAccountStore;
    use crate::store::types::NetworkAccount;

    async fn store_with_others_accounts() -> Arc<InMemoryAccountStore> {
        let store = Arc::new(InMemoryAccountStore::new());
        for wallet_id in [WALLET_ID_IMPORTED, WALLET_ID_WATCHING, WALLET_ID_EXTERNAL] {
            store
                .add_wallet(DbWallet {
                    id: WalletId::new(wallet_id),
                    name: wallet_id.to_string(),
                    associated_device: None,
                    is_temp: false,
                })
                .await;
        }
        store
            .add_db_account(DbAccount {
                id: "acc-i1".to_string(),
                name: "Imported #1".to_string(),
                address: "0x1".to_string(),
                impl_coin: "evm".to_string(),
                wallet_id: Some(WalletId::new(WALLET_ID_IMPORTED)),
                indexed_account_id: None,
            })
            .await;
        store
            .add_db_account(DbAccount {
                id: "acc-w1".to_string(),
                name: "Watched #1".to_string(),
                address: "bc1q".to_string(),
                impl_coin: "btc".to_string(),
                wallet_id: Some(WalletId::new(WALLET_ID_WATCHING)),
                indexed_account_id: None,
            })
            .await;
        store
    }

    #[tokio::test]
    async fn others_group_yields_three_sections_in_order() {
        let store = store_with_others_accounts().await;
        let builder = AccountsListBuilder::new(store);

        let sections = builder
            .get_accounts_list_section_data(
                Some(&FocusedWallet::OthersGroup),
                None,
                None,
                &DeriveType::default(),
            )
            .await
            .unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].wallet_id, WalletId::new(WALLET_ID_IMPORTED));
        assert_eq!(sections[1].wallet_id, WalletId::new(WALLET_ID_WATCHING));
        assert_eq!(sections[2].wallet_id, WalletId::new(WALLET_ID_EXTERNAL));
        assert_eq!(sections[0].title, "Private key");
        assert_eq!(sections[0].data.len(), 1);
        assert_eq!(sections[2].data.len(), 0);
        assert!(sections[2].first_account.is_none());
    }

    #[tokio::test]
    async fn no_focus_and_removed_wallet_yield_empty() {
        let store = Arc::new(InMemoryAccountStore::new());
        let builder = AccountsListBuilder::new(store);

        assert!(
            builder
                .get_accounts_list_section_data(None, None, None, &DeriveType::default())
                .await
                .unwrap()
                .is_empty()
        );
        let gone = FocusedWallet::Wallet(WalletId::new("hd-gone"));
        assert!(
            builder
                .get_accounts_list_section_data(Some(&gone), None, None, &DeriveType::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert!(builder.get_focused_wallet_info(Some(&gone)).await.is_none());
    }

    #[tokio::test]
    async fn linked_network_filters_singleton_accounts() {
        let store = store_with_others_accounts().await;
        store
            .add_db_account(DbAccount {
                id: "acc-i2".to_string(),
                name: "Imported #2".to_string(),
                address: "bc1p".to_string(),
                impl_coin: "btc".to_string(),
                wallet_id: Some(WalletId::new(WALLET_ID_IMPORTED)),
                indexed_account_id: None,
            })
            .await;
        let builder = AccountsListBuilder::new(store);

        let focus = FocusedWallet::Wallet(WalletId::new(WALLET_ID_IMPORTED));
        let sections = builder
            .get_accounts_list_section_data(
                Some(&focus),
                None,
                Some("btc--0"),
                &DeriveType::default(),
            )
            .await
            .unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].data.len(), 1);
        assert_eq!(sections[0].data[0].id(), "acc-i2");
        assert_eq!(sections[0].title, "");
    }

    async fn store_with_hd_wallet() -> Arc<InMemoryAccountStore> {
        let store = Arc::new(InMemoryAccountStore::new());
        store
            .add_wallet(DbWallet {
                id: WalletId::new("hd-1"),
                name: "Wallet 1".to_string(),
                associated_device: None,
                is_temp: false,
            })
            .await;
        for (id, index) in [("idx-1", 0u32), ("idx-2", 1u32)] {
            store
                .add_indexed_account(DbIndexedAccount {
                    id: id.to_string(),
                    wallet_id: WalletId::new("hd-1"),
                    name: format!("Account #{}", index + 1),
                    index,
                    associate_account: None,
                })
                .await;
        }
        store
            .link_derived_account("idx-1", "evm--1", &DeriveType::default(), "acc-1")
            .await;
        store
            .insert_network_account(
                "acc-1",
                "evm--1",
                NetworkAccount {
                    id: "acc-1".to_string(),
                    name: "Account #1".to_string(),
                    address: Some("0xabc".to_string()),
                    impl_coin: "evm".to_string(),
                },
            )
            .await;
        store
    }

    #[tokio::test]
    async fn hd_wallet_links_network_accounts_per_entry() {
        let store = store_with_hd_wallet().await;
        let builder = AccountsListBuilder::new(store);

        let focus = FocusedWallet::Wallet(WalletId::new("hd-1"));
        let sections = builder
            .get_accounts_list_section_data(
                Some(&focus),
                None,
                Some("evm--1"),
                &DeriveType::default(),
            )
            .await
            .unwrap();

        assert_eq!(sections.len(), 1);
        let data = &sections[0].data;
        assert_eq!(data.len(), 2);
        match (&data[0], &data[1]) {
            (AccountsListItem::Indexed(first), AccountsListItem::Indexed(second)) => {
                // Only idx-1 has a derived account on evm--1; idx-2's failure
                // is isolated to its own entry.
                assert_eq!(
                    first.associate_account.as_ref().map(|a| a.id.as_str()),
                    Some("acc-1")
                );
                assert!(second.associate_account.is_none());
            }
            other => panic!("expected indexed entries, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn accounts_list_data_includes_count_and_wallet_info() {
        let store = store_with_hd_wallet().await;
        let builder = AccountsListBuilder::new(store);

        let focus = FocusedWallet::Wallet(WalletId::new("hd-1"));
        let data = builder
            .build_accounts_list_data(Some(&focus), None, None, &DeriveType::default())
            .await
            .unwrap();

        assert_eq!(data.accounts_count, 2);
        let info = data.focused_wallet_info.unwrap();
        assert_eq!(info.wallet.name, "Wallet 1");
        assert!(info.device.is_none());
    }
}
