use super::*;
use crate::state::Settings;
use std::sync::RwLock;
use tablesmith_core::{DEFAULT_MAX_HISTORY, Error};

/// Settings held in process memory
pub struct InMemorySettingsStore {
    settings: RwLock<Settings>,
    max_history: usize,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            settings: RwLock::new(Settings::default()),
            max_history,
        }
    }

    /// Start from an existing snapshot
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> Result<Settings> {
        self.read(Settings::clone)
    }

    fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> Result<R> {
        let settings = self
            .settings
            .read()
            .map_err(|_| Error::Settings("settings lock poisoned".to_string()))?;
        Ok(f(&settings))
    }

    fn update<R>(&self, f: impl FnOnce(&mut Settings) -> R) -> Result<R> {
        let mut settings = self
            .settings
            .write()
            .map_err(|_| Error::Settings("settings lock poisoned".to_string()))?;
        Ok(f(&mut settings))
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn connection_infos(&self) -> Result<Vec<ConnectionInfo>> {
        self.read(|s| s.connections.clone())
    }

    async fn save_connection_infos(&self, connections: Vec<ConnectionInfo>) -> Result<()> {
        self.update(|s| s.set_connections(connections))
    }

    async fn last_generator_params(&self) -> Result<Option<GeneratorParamWrapper>> {
        self.read(|s| s.last_generator_params.clone())
    }

    async fn save_last_generator_params(&self, params: GeneratorParamWrapper) -> Result<()> {
        self.update(|s| s.last_generator_params = Some(params))
    }

    async fn save_table_infos(&self, tables: Vec<TableInfo>) -> Result<()> {
        self.update(|s| s.upsert_table_infos(tables))
    }

    async fn table_info(&self, key: &TableInfo) -> Result<Option<TableInfo>> {
        self.read(|s| s.table_info(key))
    }

    async fn add_history(&self, category: HistoryCategory, value: &str) -> Result<()> {
        let max_history = self.max_history;
        self.update(|s| {
            s.history.append(category, value, max_history);
        })
    }

    async fn history(&self) -> Result<History> {
        self.read(|s| s.history.clone())
    }

    async fn clear_history(&self) -> Result<()> {
        self.update(|s| s.history.clear())
    }

    async fn default_parameters(&self) -> Result<DefaultParameters> {
        self.read(|s| s.default_parameters.clone())
    }

    async fn save_default_parameters(&self, parameters: DefaultParameters) -> Result<()> {
        self.update(|s| s.default_parameters = parameters)
    }
}
