mod selector;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::selector::{
    ActiveAccountResolver, DeriveTypeSync, EventDispatcher, SceneId, SceneName, SelectedAccount,
    SelectedAccountsMap, SelectionReconciler, SelectorEvent, SelectorEventHandler,
};
use crate::store::{
    DbAccount, DbIndexedAccount, DbWallet, DeriveInfo, DeriveType, FileSelectionRepository,
    InMemoryAccountStore, InMemoryNetworkRegistry, InMemorySettings, NetworkAccount, NetworkInfo,
    SelectionRepository, SelectorError, VaultSettings, WalletId,
};

struct LoggingHandler;

#[async_trait::async_trait]
impl SelectorEventHandler for LoggingHandler {
    async fn handle(&self, event: &SelectorEvent) -> Result<(), SelectorError> {
        info!("selector event: {event:?}");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LoggingHandler"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::time())
        .init();

    info!("Starting account selector service");

    let accounts = Arc::new(InMemoryAccountStore::new());
    let networks = Arc::new(InMemoryNetworkRegistry::new());
    seed_stores(&accounts, &networks).await;

    let data_dir = std::env::var("SELECTOR_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./selector-data"));
    let selection = Arc::new(FileSelectionRepository::new(data_dir));
    let settings = Arc::new(InMemorySettings::new());

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register_handler(Arc::new(LoggingHandler));
    let dispatcher = Arc::new(dispatcher);

    let resolver = ActiveAccountResolver::new(accounts.clone(), networks.clone(), networks.clone());
    let reconciler = SelectionReconciler::new(selection.clone(), settings.clone());
    let derive_sync = DeriveTypeSync::new(networks.clone(), dispatcher);

    // Persist a home selection, then walk the swap scene through the full
    // init path: load, derive-type fixup, home merge, resolution.
    let home_scene = SceneId::plain(SceneName::Home);
    let home_selection = SelectedAccount {
        wallet_id: Some(WalletId::new("hd-1")),
        indexed_account_id: Some("idx-1".to_string()),
        network_id: Some("evm--1".to_string()),
        derive_type: Some(DeriveType::default()),
        ..Default::default()
    };
    if let Err(e) = selection
        .save_selected_account(&home_scene, 0, &home_selection)
        .await
    {
        error!("Failed to persist home selection: {e}");
        return;
    }

    let swap_scene = SceneId::plain(SceneName::Swap);
    let swap_map = match selection.get_selected_accounts_map(&swap_scene).await {
        Ok(map) => map.unwrap_or_else(SelectedAccountsMap::new),
        Err(e) => {
            error!("Failed to load swap selections: {e}");
            return;
        }
    };

    let swap_map = derive_sync
        .fix_derive_types_for_init_account_selector_map(swap_map, SceneName::Swap)
        .await;

    let swap_map = reconciler
        .merge_home_data_to_swap_map(Some(&swap_map))
        .await
        .unwrap_or_default();

    if let Err(e) = selection
        .save_selected_accounts_map(&swap_scene, &swap_map)
        .await
    {
        error!("Failed to persist swap selections: {e}");
        return;
    }

    if let Err(e) = derive_sync
        .save_global_derive_type(&home_selection, SceneName::Home, 0, false)
        .await
    {
        error!("Failed to save global derive type: {e}");
        return;
    }

    for (num, selected) in &swap_map {
        let resolved = resolver
            .build_active_account_info_from_selected_account(selected, None)
            .await;
        let active = &resolved.active_account;
        info!(
            "swap slot {num}: account {:?} on network {:?} (ready={}, can_create={})",
            active.account_name,
            active.network.as_ref().map(|n| n.id.as_str()),
            active.ready,
            active.can_create_address
        );
    }

    info!("Account selector service finished");
}

async fn seed_stores(accounts: &InMemoryAccountStore, networks: &InMemoryNetworkRegistry) {
    accounts
        .add_wallet(DbWallet {
            id: WalletId::new("hd-1"),
            name: "Wallet 1".to_string(),
            associated_device: None,
            is_temp: false,
        })
        .await;
    accounts
        .add_indexed_account(DbIndexedAccount {
            id: "idx-1".to_string(),
            wallet_id: WalletId::new("hd-1"),
            name: "Account #1".to_string(),
            index: 0,
            associate_account: None,
        })
        .await;
    accounts
        .add_db_account(DbAccount {
            id: "acc-1".to_string(),
            name: "Account #1".to_string(),
            address: "0xabc".to_string(),
            impl_coin: "evm".to_string(),
            wallet_id: Some(WalletId::new("hd-1")),
            indexed_account_id: Some("idx-1".to_string()),
        })
        .await;
    accounts
        .link_derived_account("idx-1", "evm--1", &DeriveType::default(), "acc-1")
        .await;
    accounts
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

    networks
        .add_network(NetworkInfo {
            id: "evm--1".to_string(),
            name: "Ethereum".to_string(),
        })
        .await;
    networks
        .set_vault_settings(VaultSettings {
            network_id: "evm--1".to_string(),
            qr_account_enabled: true,
        })
        .await;
    networks
        .add_derive_info(
            "evm--1",
            DeriveType::default(),
            DeriveInfo {
                name_prefix: "EVM".to_string(),
                template: "m/44'/60'/0'/0/$$INDEX$$".to_string(),
                label: Some("Default".to_string()),
            },
            "Default",
        )
        .await;
}
