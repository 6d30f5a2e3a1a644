//! Network-scoped global derive type synchronization.
//!
//! Scenes that opt in share one derive type per network. Reads return nothing
//! for opted-out scenes and for "others" wallets, which never participate.
//! Writes are suppressed when the stored value already matches, and emit a
//! change event unless the caller disables it.

use crate::selector::events::{EventDispatcher, SelectorEvent};
use crate::selector::scene::is_scene_using_global_derive_type;
use crate::selector::types::{SceneName, SelectedAccount, SelectedAccountsMap};
use crate::store::networks::NetworkRegistry;
use crate::store::types::{DeriveType, SelectorError};
use futures::future::join_all;
use std::sync::Arc;
use tracing::debug;

/// Keeps per-scene derive types aligned with the network-scoped global value.
pub struct DeriveTypeSync {
    networks: Arc<dyn NetworkRegistry>,
    dispatcher: Arc<EventDispatcher>,
}

impl DeriveTypeSync {
    pub fn new(networks: Arc<dyn NetworkRegistry>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            networks,
            dispatcher,
        }
    }

    /// Whether the scene shares the global derive type at all.
    pub fn should_use_global_derive_type(&self, scene: SceneName) -> bool {
        is_scene_using_global_derive_type(scene)
    }

    /// Read the global derive type applicable to a selection. Returns `None`
    /// for opted-out scenes, selections without a network, and "others"
    /// wallets.
    pub async fn get_global_derive_type(
        &self,
        selected: &SelectedAccount,
        scene: Option<SceneName>,
    ) -> Option<DeriveType> {
        if let Some(scene) = scene {
            if !self.should_use_global_derive_type(scene) {
                return None;
            }
        }
        let network_id = selected.network_id.as_deref()?;
        if selected
            .wallet_id
            .as_ref()
            .is_some_and(|wallet_id| wallet_id.is_others())
        {
            return None;
        }
        match self
            .networks
            .get_global_derive_type_of_network(network_id)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                debug!("global derive type unresolved for {network_id}: {e}");
                None
            }
        }
    }

    /// Persist the selection's derive type as the network's global value.
    /// No-op for opted-out scenes and "others" wallets; skips the write when
    /// the stored value is already equal.
    pub async fn save_global_derive_type(
        &self,
        selected: &SelectedAccount,
        scene: SceneName,
        num: usize,
        event_emit_disabled: bool,
    ) -> Result<(), SelectorError> {
        if !self.should_use_global_derive_type(scene) {
            return Ok(());
        }
        if selected
            .wallet_id
            .as_ref()
            .is_some_and(|wallet_id| wallet_id.is_others())
        {
            return Ok(());
        }
        let (Some(network_id), Some(derive_type)) =
            (selected.network_id.as_deref(), selected.derive_type.as_ref())
        else {
            return Ok(());
        };

        let current = self.get_global_derive_type(selected, Some(scene)).await;
        if current.as_ref() == Some(derive_type) {
            debug!(
                "global derive type for {network_id} already {derive_type}, skipping write (scene {scene} num {num})"
            );
            return Ok(());
        }

        self.networks
            .save_global_derive_type_for_network(network_id, derive_type)
            .await?;

        if !event_emit_disabled {
            self.dispatcher
                .dispatch(&SelectorEvent::GlobalDeriveTypeChanged {
                    network_id: network_id.to_string(),
                    derive_type: derive_type.clone(),
                })
                .await;
        }
        Ok(())
    }

    /// Fix up every slot of a scene map loaded from the database: the global
    /// derive type wins, then the stored value, then the default sentinel.
    /// "Others" wallets are always forced to the default. Slots are fixed
    /// concurrently; order between them does not matter and one slot's
    /// failure never affects another.
    pub async fn fix_derive_types_for_init_account_selector_map(
        &self,
        mut map: SelectedAccountsMap,
        scene: SceneName,
    ) -> SelectedAccountsMap {
        let fixups = map
            .iter()
            .filter(|(_, selected)| selected.network_id.is_some())
            .map(|(num, selected)| {
                let num = *num;
                let selected = selected.clone();
                async move {
                    let global = self.get_global_derive_type(&selected, Some(scene)).await;
                    let mut derive_type = global
                        .or_else(|| selected.derive_type.clone())
                        .unwrap_or_default();
                    if selected
                        .wallet_id
                        .as_ref()
                        .is_some_and(|wallet_id| wallet_id.is_others())
                    {
                        derive_type = DeriveType::default();
                    }
                    (num, derive_type)
                }
            })
            .collect::<Vec<_>>();

        for (num, derive_type) in join_all(fixups).await {
            if let Some(selected) = map.get_mut(&num) {
                selected.derive_type = Some(derive_type);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::events::SelectorEventHandler;
    use crate::store::networks::InMemoryNetworkRegistry;
    use crate::store::types::WalletId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        seen: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SelectorEventHandler for CountingHandler {
        async fn handle(&self, _event: &SelectorEvent) -> Result<(), SelectorError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct Fixture {
        registry: Arc<InMemoryNetworkRegistry>,
        handler: Arc<CountingHandler>,
        sync: DeriveTypeSync,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryNetworkRegistry::new());
        let handler = Arc::new(CountingHandler {
            seen: AtomicUsize::new(0),
        });
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register_handler(handler.clone());
        let sync = DeriveTypeSync::new(registry.clone(), Arc::new(dispatcher));
        Fixture {
            registry,
            handler,
            sync,
        }
    }

    fn btc_selection(wallet: &str) -> SelectedAccount {
        SelectedAccount {
            wallet_id: Some(WalletId::new(wallet)),
            network_id: Some("btc--0".to_string()),
            derive_type: Some(DeriveType::new("BIP86")),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn others_wallets_never_touch_the_global_value() {
        let fixture = fixture();
        fixture
            .registry
            .save_global_derive_type_for_network("btc--0", &DeriveType::new("BIP44"))
            .await
            .unwrap();

        for wallet in ["imported", "watching", "external"] {
            let selection = btc_selection(wallet);
            assert_eq!(
                fixture
                    .sync
                    .get_global_derive_type(&selection, Some(SceneName::Home))
                    .await,
                None
            );
            fixture
                .sync
                .save_global_derive_type(&selection, SceneName::Home, 0, false)
                .await
                .unwrap();
        }

        // Stored value untouched, no events emitted.
        assert_eq!(
            fixture
                .registry
                .get_global_derive_type_of_network("btc--0")
                .await
                .unwrap(),
            Some(DeriveType::new("BIP44"))
        );
        assert_eq!(fixture.handler.seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn save_skips_write_when_value_unchanged() {
        let fixture = fixture();
        let selection = btc_selection("hd-1");

        fixture
            .sync
            .save_global_derive_type(&selection, SceneName::Home, 0, false)
            .await
            .unwrap();
        assert_eq!(fixture.handler.seen.load(Ordering::SeqCst), 1);

        // Same value again: compare-and-skip, no second event.
        fixture
            .sync
            .save_global_derive_type(&selection, SceneName::Home, 0, false)
            .await
            .unwrap();
        assert_eq!(fixture.handler.seen.load(Ordering::SeqCst), 1);

        // A different value writes and notifies.
        let mut changed = selection.clone();
        changed.derive_type = Some(DeriveType::new("BIP44"));
        fixture
            .sync
            .save_global_derive_type(&changed, SceneName::Home, 0, false)
            .await
            .unwrap();
        assert_eq!(fixture.handler.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn save_honors_event_suppression_and_scene_opt_out() {
        let fixture = fixture();
        let selection = btc_selection("hd-1");

        fixture
            .sync
            .save_global_derive_type(&selection, SceneName::Discover, 0, false)
            .await
            .unwrap();
        assert_eq!(
            fixture
                .registry
                .get_global_derive_type_of_network("btc--0")
                .await
                .unwrap(),
            None
        );

        fixture
            .sync
            .save_global_derive_type(&selection, SceneName::Home, 0, true)
            .await
            .unwrap();
        assert_eq!(
            fixture
                .registry
                .get_global_derive_type_of_network("btc--0")
                .await
                .unwrap(),
            Some(DeriveType::new("BIP86"))
        );
        assert_eq!(fixture.handler.seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn get_requires_network_id() {
        let fixture = fixture();
        let selection = SelectedAccount {
            wallet_id: Some(WalletId::new("hd-1")),
            derive_type: Some(DeriveType::new("BIP86")),
            ..Default::default()
        };
        assert_eq!(
            fixture
                .sync
                .get_global_derive_type(&selection, Some(SceneName::Home))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn init_fixup_applies_global_then_stored_then_default() {
        let fixture = fixture();
        fixture
            .registry
            .save_global_derive_type_for_network("btc--0", &DeriveType::new("BIP44"))
            .await
            .unwrap();

        let mut map = SelectedAccountsMap::new();
        // Slot 0: global value available, overrides the stored one.
        map.insert(0, btc_selection("hd-1"));
        // Slot 1: no global value for this network, stored value kept.
        map.insert(
            1,
            SelectedAccount {
                wallet_id: Some(WalletId::new("hd-1")),
                network_id: Some("evm--1".to_string()),
                derive_type: Some(DeriveType::new("ledger-live")),
                ..Default::default()
            },
        );
        // Slot 2: nothing stored at all, falls back to the sentinel.
        map.insert(
            2,
            SelectedAccount {
                wallet_id: Some(WalletId::new("hd-1")),
                network_id: Some("evm--1".to_string()),
                ..Default::default()
            },
        );
        // Slot 3: others wallet is always forced to the sentinel.
        map.insert(3, btc_selection("imported"));
        // Slot 4: without a network id the slot is left alone.
        map.insert(
            4,
            SelectedAccount {
                derive_type: Some(DeriveType::new("BIP86")),
                ..Default::default()
            },
        );

        let fixed = fixture
            .sync
            .fix_derive_types_for_init_account_selector_map(map, SceneName::Home)
            .await;

        assert_eq!(fixed[&0].derive_type, Some(DeriveType::new("BIP44")));
        assert_eq!(fixed[&1].derive_type, Some(DeriveType::new("ledger-live")));
        assert_eq!(fixed[&2].derive_type, Some(DeriveType::default()));
        assert_eq!(fixed[&3].derive_type, Some(DeriveType::default()));
        assert_eq!(fixed[&4].derive_type, Some(DeriveType::new("BIP86")));
    }
}
