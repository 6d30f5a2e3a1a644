//! Active account resolution.
//!
//! Turns a selection descriptor into a fully materialized `ActiveAccountInfo`
//! by cross-referencing the account store, network registry and vault
//! settings. Every lookup is individually fault-isolated: a missing or
//! incompatible entity leaves its field unresolved and the pipeline keeps
//! going. The worst outcome is a mostly-empty snapshot with
//! `is_network_not_matched` set, never an error.

use crate::selector::types::{ActiveAccountInfo, FocusedWallet, SelectedAccount};
use crate::store::accounts::AccountStore;
use crate::store::networks::{NetworkRegistry, VaultSettingsProvider};
use crate::store::types::{SelectorError, is_all_network};
use std::sync::Arc;
use tracing::debug;

/// Result of one resolution call: the snapshot plus a normalized selection
/// re-derived from what actually resolved (not an echo of the input).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelection {
    pub active_account: ActiveAccountInfo,
    pub selected_account: SelectedAccount,
    pub nonce: Option<u64>,
}

/// Resolves selection descriptors against the stores.
pub struct ActiveAccountResolver {
    accounts: Arc<dyn AccountStore>,
    networks: Arc<dyn NetworkRegistry>,
    vault_settings: Arc<dyn VaultSettingsProvider>,
}

fn tolerate<T>(what: &str, result: Result<T, SelectorError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("{what} unresolved: {e}");
            None
        }
    }
}

impl ActiveAccountResolver {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        networks: Arc<dyn NetworkRegistry>,
        vault_settings: Arc<dyn VaultSettingsProvider>,
    ) -> Self {
        Self {
            accounts,
            networks,
            vault_settings,
        }
    }

    /// Materialize the selection into an `ActiveAccountInfo` snapshot.
    ///
    /// The `nonce` is passed through untouched so callers can discard stale
    /// in-flight results.
    pub async fn build_active_account_info_from_selected_account(
        &self,
        selected: &SelectedAccount,
        nonce: Option<u64>,
    ) -> ResolvedSelection {
        debug!(?selected, "building active account info");

        let SelectedAccount {
            wallet_id,
            indexed_account_id,
            others_wallet_account_id,
            network_id,
            derive_type,
            focused_wallet: _,
        } = selected;

        let mut wallet = match wallet_id {
            Some(wallet_id) => tolerate("wallet", self.accounts.get_wallet(wallet_id).await),
            None => None,
        };

        let mut indexed_account = match indexed_account_id {
            Some(id) if wallet.is_some() => {
                tolerate("indexed account", self.accounts.get_indexed_account(id).await)
            }
            _ => None,
        };

        // Working db-account id: the loose others-wallet id wins, otherwise
        // derive it from the indexed account when the full triple is known.
        let mut db_account_id = others_wallet_account_id.clone().unwrap_or_default();
        if db_account_id.is_empty() {
            if let (Some(indexed_account_id), Some(network_id), Some(derive_type)) =
                (indexed_account_id, network_id, derive_type)
            {
                db_account_id = tolerate(
                    "derived account id",
                    self.accounts
                        .get_db_account_id_from_indexed_account_id(
                            indexed_account_id,
                            network_id,
                            derive_type,
                        )
                        .await,
                )
                .unwrap_or_default();
            }
        }

        let mut network = None;
        let mut vault_settings = None;
        let mut account = None;
        let mut derive_info = None;
        if let Some(network_id) = network_id {
            network = tolerate("network", self.networks.get_network(network_id).await);
            if let Some(network) = &network {
                if !is_all_network(&network.id) {
                    vault_settings = tolerate(
                        "vault settings",
                        self.vault_settings.get_vault_settings(&network.id).await,
                    );
                }
            }

            if (indexed_account_id.is_some() && wallet.is_some())
                || others_wallet_account_id.is_some()
            {
                // Incompatibility with the network is expected here.
                account = tolerate(
                    "network account",
                    self.accounts
                        .get_network_account(
                            indexed_account_id.as_deref(),
                            others_wallet_account_id.as_deref(),
                            network_id,
                            derive_type.as_ref(),
                        )
                        .await,
                );
            }

            if let Some(derive_type) = derive_type {
                derive_info = tolerate(
                    "derive info",
                    self.networks
                        .get_derive_info_of_network(network_id, derive_type)
                        .await,
                );
            }
        }

        let is_all_network_selection = network_id.as_deref().is_some_and(is_all_network);

        let mut db_account = None;
        if !db_account_id.is_empty() && !is_all_network_selection {
            db_account = tolerate(
                "db account",
                self.accounts.get_db_account(&db_account_id).await,
            );
        }

        // Removed temporary wallet invalidates everything hanging off it.
        if let Some(w) = &wallet {
            if self
                .accounts
                .is_temp_wallet_removed(w)
                .await
                .unwrap_or(false)
            {
                wallet = None;
                account = None;
                indexed_account = None;
            }
        }

        let is_others_wallet = wallet.as_ref().is_some_and(|w| w.id.is_others())
            || (account.is_some() && indexed_account_id.is_none());
        let is_qr_wallet = wallet.as_ref().is_some_and(|w| w.id.is_qr());
        let is_hw_wallet = wallet.as_ref().is_some_and(|w| w.id.is_hw());

        let account_name = if let Some(account) = &account {
            account.name.clone()
        } else if let Some(indexed_account) = &indexed_account {
            // Logical account exists but nothing materialized yet.
            indexed_account.name.clone()
        } else if let Some(db_account) = &db_account {
            // Others account incompatible with the network.
            db_account.name.clone()
        } else {
            String::new()
        };

        let mut device = None;
        if is_hw_wallet || is_qr_wallet {
            if let Some(device_id) = wallet.as_ref().and_then(|w| w.associated_device.clone()) {
                device = tolerate("device", self.accounts.get_device(&device_id).await);
            }
        }

        let mut all_network_db_accounts = None;
        let mut can_create_address = false;
        if is_all_network_selection {
            if let Some(network_id) = network_id {
                all_network_db_accounts = tolerate(
                    "all-network db accounts",
                    self.accounts
                        .get_all_network_db_accounts(
                            network_id,
                            indexed_account_id.as_deref(),
                            others_wallet_account_id.as_deref(),
                        )
                        .await,
                );
            }

            if !is_others_wallet {
                if let Some(indexed_account_id) = indexed_account_id {
                    let has_accounts = all_network_db_accounts
                        .as_ref()
                        .is_some_and(|accounts| !accounts.is_empty());
                    if has_accounts {
                        match self
                            .accounts
                            .get_mocked_all_network_account(indexed_account_id)
                            .await
                        {
                            Ok(mocked) => {
                                account = Some(mocked);
                                can_create_address = false;
                            }
                            Err(e) => {
                                debug!("all-network account unresolved: {e}");
                                account = None;
                                can_create_address = true;
                            }
                        }
                    } else {
                        account = None;
                        can_create_address = true;
                    }
                }
            }
        } else {
            can_create_address =
                !is_others_wallet && !account.as_ref().is_some_and(|a| a.has_address());
            if is_qr_wallet {
                // QR wallets create addresses only where the vault allows it.
                if let Some(vault_settings) = &vault_settings {
                    can_create_address = vault_settings.qr_account_enabled;
                }
            }
        }

        let is_network_not_matched = if account.is_none() && indexed_account.is_none() {
            is_others_wallet
        } else if account.is_none() && indexed_account.is_some() {
            is_qr_wallet && !can_create_address
        } else {
            false
        };

        let derive_info_items = tolerate(
            "derive info items",
            self.networks
                .get_derive_info_items_of_network(network_id.as_deref())
                .await,
        )
        .unwrap_or_default();

        let active_account = ActiveAccountInfo {
            account,
            db_account,
            all_network_db_accounts,
            indexed_account,
            wallet,
            device,
            network,
            vault_settings,
            derive_type: derive_type.clone(),
            derive_info,
            derive_info_items,
            account_name,
            ready: true,
            is_others_wallet,
            can_create_address,
            is_network_not_matched,
        };

        // Normalize from the resolved entities so the persisted selection is
        // self-consistent with what was actually found.
        let selected_account = SelectedAccount {
            others_wallet_account_id: if active_account.is_others_wallet {
                active_account.account.as_ref().map(|a| a.id.clone())
            } else {
                None
            },
            indexed_account_id: active_account
                .indexed_account
                .as_ref()
                .map(|a| a.id.clone()),
            derive_type: active_account.derive_type.clone(),
            network_id: active_account.network.as_ref().map(|n| n.id.clone()),
            wallet_id: active_account.wallet.as_ref().map(|w| w.id.clone()),
            focused_wallet: active_account
                .wallet
                .as_ref()
                .map(|w| FocusedWallet::Wallet(w.id.clone())),
        };

        ResolvedSelection {
            active_account,
            selected_account,
            nonce,
        }
    }
}
