//! Selection reconciler for scenes coupled to home.
//!
//! The swap scene's persisted map is merged with the home selection before
//! use: non-empty home fields override the swap slot's fields, and the merged
//! slot's network id is then forced to home's regardless of the merge result,
//! so cross-scene account identity always follows the home network. The
//! caller's map is never mutated.

use crate::selector::types::{SceneId, SceneName, SelectedAccount, SelectedAccountsMap};
use crate::store::selection::SelectionRepository;
use crate::store::settings::SettingsReader;
use std::sync::Arc;
use tracing::{debug, warn};

/// Merge one selection over another: non-empty fields of `merged_by` win.
pub fn build_merged_selected_account(
    data: Option<&SelectedAccount>,
    merged_by: &SelectedAccount,
) -> SelectedAccount {
    let base = data.cloned().unwrap_or_default();
    SelectedAccount {
        wallet_id: merged_by.wallet_id.clone().or(base.wallet_id),
        indexed_account_id: merged_by
            .indexed_account_id
            .clone()
            .or(base.indexed_account_id),
        others_wallet_account_id: merged_by
            .others_wallet_account_id
            .clone()
            .or(base.others_wallet_account_id),
        network_id: merged_by.network_id.clone().or(base.network_id),
        derive_type: merged_by.derive_type.clone().or(base.derive_type),
        focused_wallet: merged_by.focused_wallet.clone().or(base.focused_wallet),
    }
}

/// Reconciles the swap scene's stored selections with home.
pub struct SelectionReconciler {
    selection: Arc<dyn SelectionRepository>,
    settings: Arc<dyn SettingsReader>,
}

impl SelectionReconciler {
    pub fn new(selection: Arc<dyn SelectionRepository>, settings: Arc<dyn SettingsReader>) -> Self {
        Self {
            selection,
            settings,
        }
    }

    /// Merge the home slot-0 selection into the swap map. Returns a new map;
    /// the input is cloned, never mutated. With no home selection the input
    /// passes through unchanged.
    pub async fn merge_home_data_to_swap_map(
        &self,
        swap_map: Option<&SelectedAccountsMap>,
    ) -> Option<SelectedAccountsMap> {
        let home_data = match self
            .selection
            .get_selected_account(&SceneId::plain(SceneName::Home), 0)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!("failed to read home selection, treating as absent: {e}");
                None
            }
        };

        let Some(home_data) = home_data else {
            return swap_map.cloned();
        };

        let mut map = swap_map.cloned().unwrap_or_default();

        let update_slot = |map: &mut SelectedAccountsMap, num: usize| {
            let mut merged = build_merged_selected_account(map.get(&num), &home_data);
            // Account identity follows the home network even when the merge
            // kept other swap fields.
            merged.network_id = home_data.network_id.clone();
            debug!("merged home selection into swap slot {num}");
            map.insert(num, merged);
        };

        update_slot(&mut map, 0);

        let settings = self.settings.settings().await;
        if !settings.swap_to_another_account_switch_on {
            update_slot(&mut map, 1);
        }

        Some(map)
    }
}
