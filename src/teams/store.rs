use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{ConfigStore, ConnectionStatus};
use crate::client::DaemonConfig;

/// Everything stored for one team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DaemonConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectionStatus>,
}

#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    records: RwLock<BTreeMap<String, TeamRecord>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn get_config(&self, team_id: &str) -> Result<Option<DaemonConfig>> {
        let records = self.records.read().await;
        Ok(records.get(team_id).and_then(|record| record.config.clone()))
    }

    async fn set_config(&self, team_id: &str, config: DaemonConfig) -> Result<()> {
        let mut records = self.records.write().await;
        records.entry(team_id.to_string()).or_default().config = Some(config);
        Ok(())
    }

    async fn get_status(&self, team_id: &str) -> Result<Option<ConnectionStatus>> {
        let records = self.records.read().await;
        Ok(records.get(team_id).and_then(|record| record.status.clone()))
    }

    async fn set_status(&self, team_id: &str, status: ConnectionStatus) -> Result<()> {
        let mut records = self.records.write().await;
        records.entry(team_id.to_string()).or_default().status = Some(status);
        Ok(())
    }
}

/// JSON file keyed by team id, rewritten atomically on every change
#[derive(Debug)]
pub struct FileConfigStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, TeamRecord>>,
}

impl FileConfigStore {
    /// Open the store at `path`, starting empty when the file does not exist
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read team store {}", path.display()))?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse team store {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            path = %path.display(),
            teams = records.len(),
            "Opened team configuration store"
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<String, TeamRecord>) -> Result<()> {
        let contents = serde_json::to_string_pretty(records)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &contents))
            .await
            .context("Team store writer task failed")?
    }

    async fn update(&self, team_id: &str, apply: impl FnOnce(&mut TeamRecord)) -> Result<()> {
        let mut records = self.records.write().await;
        let mut updated = records.clone();
        apply(updated.entry(team_id.to_string()).or_default());

        // Memory only changes once the file is written
        self.persist(&updated).await?;
        *records = updated;
        Ok(())
    }
}

/// Temp file + rename, so readers never see a partial store
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, contents)?;

    match std::fs::rename(&temp_path, path) {
        Ok(_) => {
            debug!(path = %path.display(), "Persisted team configuration store");
            Ok(())
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Failed to persist team configuration store"
            );
            let _ = std::fs::remove_file(&temp_path);
            Err(e.into())
        }
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get_config(&self, team_id: &str) -> Result<Option<DaemonConfig>> {
        let records = self.records.read().await;
        Ok(records.get(team_id).and_then(|record| record.config.clone()))
    }

    async fn set_config(&self, team_id: &str, config: DaemonConfig) -> Result<()> {
        self.update(team_id, |record| record.config = Some(config))
            .await
    }

    async fn get_status(&self, team_id: &str) -> Result<Option<ConnectionStatus>> {
        let records = self.records.read().await;
        Ok(records.get(team_id).and_then(|record| record.status.clone()))
    }

    async fn set_status(&self, team_id: &str, status: ConnectionStatus) -> Result<()> {
        self.update(team_id, |record| record.status = Some(status))
            .await
    }
}
