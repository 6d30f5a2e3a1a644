//! Persisted per-scene selection store.
//!
//! Each scene owns one map of slot number to selection. The file-backed
//! implementation writes one JSON document per scene plus a metadata sidecar
//! recording when the selection was last saved.

use crate::selector::types::{SceneId, SelectedAccount, SelectedAccountsMap};
use crate::store::types::SelectorError;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Contract for reading and writing scene selections.
#[async_trait::async_trait]
pub trait SelectionRepository: Send + Sync {
    async fn get_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
    ) -> Result<Option<SelectedAccount>, SelectorError>;

    async fn save_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
        selected: &SelectedAccount,
    ) -> Result<(), SelectorError>;

    async fn get_selected_accounts_map(
        &self,
        scene: &SceneId,
    ) -> Result<Option<SelectedAccountsMap>, SelectorError>;

    async fn save_selected_accounts_map(
        &self,
        scene: &SceneId,
        map: &SelectedAccountsMap,
    ) -> Result<(), SelectorError>;
}

/// In-memory selection repository used by tests and the demo wiring.
#[derive(Default)]
pub struct InMemorySelectionRepository {
    scenes: RwLock<HashMap<SceneId, SelectedAccountsMap>>,
}

impl InMemorySelectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SelectionRepository for InMemorySelectionRepository {
    async fn get_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
    ) -> Result<Option<SelectedAccount>, SelectorError> {
        Ok(self
            .scenes
            .read()
            .await
            .get(scene)
            .and_then(|map| map.get(&num))
            .cloned())
    }

    async fn save_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
        selected: &SelectedAccount,
    ) -> Result<(), SelectorError> {
        self.scenes
            .write()
            .await
            .entry(scene.clone())
            .or_default()
            .insert(num, selected.clone());
        Ok(())
    }

    async fn get_selected_accounts_map(
        &self,
        scene: &SceneId,
    ) -> Result<Option<SelectedAccountsMap>, SelectorError> {
        Ok(self.scenes.read().await.get(scene).cloned())
    }

    async fn save_selected_accounts_map(
        &self,
        scene: &SceneId,
        map: &SelectedAccountsMap,
    ) -> Result<(), SelectorError> {
        self.scenes
            .write()
            .await
            .insert(scene.clone(), map.clone());
        Ok(())
    }
}

/// File-based selection repository.
pub struct FileSelectionRepository {
    data_dir: PathBuf,
}

impl FileSelectionRepository {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn get_scene_filename(&self, scene: &SceneId) -> PathBuf {
        self.data_dir
            .join(format!("selector_{}.json", scene.storage_key()))
    }

    fn get_metadata_filename(&self, scene: &SceneId) -> PathBuf {
        self.data_dir
            .join(format!("selector_{}.meta.json", scene.storage_key()))
    }

    async fn load_map(&self, scene: &SceneId) -> Result<Option<SelectedAccountsMap>, SelectorError> {
        let filename = self.get_scene_filename(scene);
        if !filename.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&filename).await.map_err(|e| {
            SelectorError::ParseError(format!("Failed to read selection file: {}", e))
        })?;
        let map: SelectedAccountsMap = serde_json::from_str(&content).map_err(|e| {
            SelectorError::ParseError(format!("Failed to parse selection file: {}", e))
        })?;

        debug!("Loaded selection map for scene {:?}", scene.storage_key());
        Ok(Some(map))
    }

    async fn store_map(
        &self,
        scene: &SceneId,
        map: &SelectedAccountsMap,
    ) -> Result<(), SelectorError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let metadata = serde_json::json!({
            "scene": scene.storage_key(),
            "slots": map.len(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_filename = self.get_metadata_filename(scene);
        tokio::fs::write(
            &metadata_filename,
            serde_json::to_string_pretty(&metadata)
                .map_err(|e| SelectorError::ParseError(e.to_string()))?,
        )
        .await
        .map_err(|e| {
            SelectorError::ParseError(format!("Failed to write selection metadata: {}", e))
        })?;

        let content = serde_json::to_string_pretty(map).map_err(|e| {
            SelectorError::ParseError(format!("Failed to serialize selection map: {}", e))
        })?;

        let filename = self.get_scene_filename(scene);
        tokio::fs::write(&filename, content).await.map_err(|e| {
            SelectorError::ParseError(format!("Failed to write selection file: {}", e))
        })?;

        info!(
            "Saved selection map for scene {:?} to {:?}",
            scene.storage_key(),
            filename
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl SelectionRepository for FileSelectionRepository {
    async fn get_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
    ) -> Result<Option<SelectedAccount>, SelectorError> {
        Ok(self
            .load_map(scene)
            .await?
            .and_then(|map| map.get(&num).cloned()))
    }

    async fn save_selected_account(
        &self,
        scene: &SceneId,
        num: usize,
        selected: &SelectedAccount,
    ) -> Result<(), SelectorError> {
        let mut map = self.load_map(scene).await?.unwrap_or_default();
        map.insert(num, selected.clone());
        self.store_map(scene, &map).await
    }

    async fn get_selected_accounts_map(
        &self,
        scene: &SceneId,
    ) -> Result<Option<SelectedAccountsMap>, SelectorError> {
        self.load_map(scene).await
    }

    async fn save_selected_accounts_map(
        &self,
        scene: &SceneId,
        map: &SelectedAccountsMap,
    ) -> Result<(), SelectorError> {
        self.store_map(scene, map).await
    }
}
