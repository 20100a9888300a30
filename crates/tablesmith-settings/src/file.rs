//! JSON-file backed settings store

use super::*;
use crate::state::Settings;
use std::path::{Path, PathBuf};
use tablesmith_core::{DEFAULT_MAX_HISTORY, SettingsConfig};
use tokio::fs;
use tokio::sync::Mutex;

/// Settings persisted as a pretty-printed JSON document.
///
/// A missing file reads as default settings; the file and its parent
/// directories are created on the first write. Writes go through a
/// temporary file and a rename.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    max_history: usize,
    lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_history: DEFAULT_MAX_HISTORY,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &SettingsConfig) -> Self {
        Self::new(&config.path).with_max_history(config.max_history)
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Settings> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path).await?;
        let settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(path = ?self.path, "Saved settings");
        Ok(())
    }

    async fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> Result<R> {
        let _guard = self.lock.lock().await;
        let settings = self.load().await?;
        Ok(f(&settings))
    }

    async fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> Result<R> {
        let _guard = self.lock.lock().await;
        let mut settings = self.load().await?;
        let result = f(&mut settings);
        self.save(&settings).await?;
        Ok(result)
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn connection_infos(&self) -> Result<Vec<ConnectionInfo>> {
        self.read(|s| s.connections.clone()).await
    }

    async fn save_connection_infos(&self, connections: Vec<ConnectionInfo>) -> Result<()> {
        self.update(|s| s.set_connections(connections)).await
    }

    async fn last_generator_params(&self) -> Result<Option<GeneratorParamWrapper>> {
        self.read(|s| s.last_generator_params.clone()).await
    }

    async fn save_last_generator_params(&self, params: GeneratorParamWrapper) -> Result<()> {
        self.update(|s| s.last_generator_params = Some(params)).await
    }

    async fn save_table_infos(&self, tables: Vec<TableInfo>) -> Result<()> {
        self.update(|s| s.upsert_table_infos(tables)).await
    }

    async fn table_info(&self, key: &TableInfo) -> Result<Option<TableInfo>> {
        self.read(|s| s.table_info(key)).await
    }

    async fn add_history(&self, category: HistoryCategory, value: &str) -> Result<()> {
        let max_history = self.max_history;
        self.update(|s| {
            s.history.append(category, value, max_history);
        })
        .await
    }

    async fn history(&self) -> Result<History> {
        self.read(|s| s.history.clone()).await
    }

    async fn clear_history(&self) -> Result<()> {
        self.update(|s| s.history.clear()).await
    }

    async fn default_parameters(&self) -> Result<DefaultParameters> {
        self.read(|s| s.default_parameters.clone()).await
    }

    async fn save_default_parameters(&self, parameters: DefaultParameters) -> Result<()> {
        self.update(|s| s.default_parameters = parameters).await
    }
}
