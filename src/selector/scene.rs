//! Scene synchronization and classification policy.
//!
//! A small fixed rule table decides which (scene, slot) pairs follow the home
//! selection, and which scenes share the network-scoped global derive type.
//! This is deliberately a lookup, not a rule engine.

use crate::selector::types::{SceneId, SceneName};
use crate::store::settings::SettingsReader;
use std::sync::Arc;

/// Scenes that read and write the network-scoped global derive type.
/// Dapp-scoped scenes pin their own derivation and stay out.
pub fn is_scene_using_global_derive_type(scene: SceneName) -> bool {
    matches!(
        scene,
        SceneName::Home | SceneName::Swap | SceneName::Earn | SceneName::Market
    )
}

/// Policy deciding which scene slots share the home selection.
pub struct SceneSyncPolicy {
    settings: Arc<dyn SettingsReader>,
}

impl SceneSyncPolicy {
    pub fn new(settings: Arc<dyn SettingsReader>) -> Self {
        Self { settings }
    }

    /// Home slot 0 and swap slot 0 always sync; swap slot 1 syncs only while
    /// the "swap to another account" switch is off. Scene equality includes
    /// the url component, so dapp-scoped scenes never match.
    pub async fn should_sync_with_home(&self, scene: &SceneId, num: usize) -> bool {
        let mut sync_scenes = vec![
            (SceneId::plain(SceneName::Home), 0),
            (SceneId::plain(SceneName::Swap), 0),
        ];

        let settings = self.settings.settings().await;
        if !settings.swap_to_another_account_switch_on {
            sync_scenes.push((SceneId::plain(SceneName::Swap), 1));
        }

        sync_scenes
            .iter()
            .any(|(candidate, slot)| candidate == scene && *slot == num)
    }
}
