use std::sync::Arc;
use tablesmith_core::{
    ColumnInfo, ConnectionInfo, DatabaseItem, DefaultParameters, Error, GeneratorParamWrapper,
    History, Result, TableInfo, TablesmithConfig,
};
use tablesmith_database::{DataSourceFactory, MetadataNormalizer, SqlxDataSourceFactory};
use tablesmith_settings::{
    EnvSecretStore, InMemorySecretStore, JsonFileSettingsStore, SecretStore, SettingsStore,
};
use tablesmith_telemetry::{OperationSpanAttributes, operation_span, stage_span};
use tracing::Instrument;

/// The unified entry point: connection management, metadata discovery and
/// the generation parameter pipeline.
///
/// Stored connection records are never handed out with a password attached;
/// operations that need one work on a decorated copy.
pub struct BuilderService {
    settings: Arc<dyn SettingsStore>,
    secrets: Arc<dyn SecretStore>,
    normalizer: MetadataNormalizer,
}

impl BuilderService {
    pub fn builder() -> BuilderServiceBuilder {
        BuilderServiceBuilder::new()
    }

    /// JSON file settings, environment passwords and the sqlx drivers
    pub fn from_config(config: &TablesmithConfig) -> Self {
        Self {
            settings: Arc::new(JsonFileSettingsStore::from_config(&config.settings)),
            secrets: Arc::new(EnvSecretStore::new()),
            normalizer: MetadataNormalizer::new(Arc::new(SqlxDataSourceFactory::new())),
        }
    }

    /// Persist the connection list; passwords go to the secret store only.
    /// Passwords of connections missing from `connections` are forgotten.
    pub async fn save_connection_infos(&self, connections: Vec<ConnectionInfo>) -> Result<()> {
        let dropped: Vec<String> = self
            .settings
            .connection_infos()
            .await?
            .into_iter()
            .map(|old| old.id)
            .filter(|id| !connections.iter().any(|info| &info.id == id))
            .collect();

        for info in &connections {
            if let Some(password) = info.password.as_deref() {
                self.secrets.save_connection_password(info, password).await?;
            }
        }

        self.settings.save_connection_infos(connections).await?;

        for connection_id in dropped {
            tracing::debug!(connection_id = %connection_id, "Removing password of dropped connection");
            self.secrets.remove_connection_password(&connection_id).await?;
        }
        Ok(())
    }

    pub async fn load_connection_infos(&self) -> Result<Vec<ConnectionInfo>> {
        self.settings.connection_infos().await
    }

    /// Copies of every stored connection with their passwords populated
    pub async fn load_connection_infos_with_password(&self) -> Result<Vec<ConnectionInfo>> {
        let mut list = Vec::new();
        for connection in self.load_connection_infos().await? {
            list.push(self.with_password(connection).await);
        }
        Ok(list)
    }

    /// Copy of the stored connection `connection_id` with its password populated
    pub async fn connection_info_with_password(&self, connection_id: &str) -> Result<ConnectionInfo> {
        let connection = self
            .load_connection_infos()
            .await?
            .into_iter()
            .find(|info| info.id == connection_id)
            .ok_or_else(|| Error::ConnectionNotFound(connection_id.to_string()))?;

        Ok(self.with_password(connection).await)
    }

    async fn with_password(&self, mut info: ConnectionInfo) -> ConnectionInfo {
        match self.secrets.connection_password(&info).await {
            Ok(Some(password)) => info.password = Some(password),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    connection_id = %info.id,
                    error = %e,
                    "Failed to get password"
                );
            }
        }
        info
    }

    pub async fn test_connection(&self, info: &ConnectionInfo) -> Result<()> {
        let span = operation_span(OperationSpanAttributes::new("test_connection", info));
        self.normalizer.test_connection(info).instrument(span).await
    }

    pub async fn fetch_databases(&self, connection_id: &str) -> Result<Vec<DatabaseItem>> {
        let info = self.connection_info_with_password(connection_id).await?;
        let span = operation_span(OperationSpanAttributes::new("list_databases", &info));
        self.normalizer.list_databases(&info).instrument(span).await
    }

    pub async fn fetch_tables(
        &self,
        connection_id: &str,
        database: &str,
    ) -> Result<Vec<DatabaseItem>> {
        let info = self.connection_info_with_password(connection_id).await?;
        let span = operation_span(
            OperationSpanAttributes::new("list_tables", &info).database(database),
        );
        self.normalizer
            .list_tables(&info, database)
            .instrument(span)
            .await
    }

    pub async fn fetch_columns(
        &self,
        connection_id: &str,
        table: &TableInfo,
    ) -> Result<Vec<ColumnInfo>> {
        let info = self.connection_info_with_password(connection_id).await?;
        self.fetch_columns_with(&info, table).await
    }

    /// Columns of `table` using an already decorated connection
    pub async fn fetch_columns_with(
        &self,
        info: &ConnectionInfo,
        table: &TableInfo,
    ) -> Result<Vec<ColumnInfo>> {
        let span = operation_span(
            OperationSpanAttributes::new("list_columns", info)
                .database(&table.database)
                .table(&table.table_name),
        );
        self.normalizer
            .list_columns(info, table)
            .instrument(span)
            .await
    }

    /// Remember `params` as the last run, keep its tables for later reuse and
    /// record its target packages in the history
    pub async fn stash_generator_params(&self, params: GeneratorParamWrapper) -> Result<()> {
        let span = stage_span(params.selected_tables.len());
        async {
            let packages: Vec<_> = params
                .target_packages()
                .into_iter()
                .map(|(category, package)| (category, package.to_string()))
                .collect();
            let tables = params.selected_tables.clone();

            self.settings.save_last_generator_params(params).await?;
            self.settings.save_table_infos(tables).await?;

            for (category, package) in packages {
                self.settings.add_history(category, &package).await?;
            }

            tracing::debug!("Staged generator parameters");
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn last_generator_params(&self) -> Result<Option<GeneratorParamWrapper>> {
        self.settings.last_generator_params().await
    }

    /// Choices remembered for the table identified by `key`
    pub async fn last_table_info(&self, key: &TableInfo) -> Result<Option<TableInfo>> {
        self.settings.table_info(key).await
    }

    pub async fn default_parameters(&self) -> Result<DefaultParameters> {
        self.settings.default_parameters().await
    }

    pub async fn save_default_parameters(&self, parameters: DefaultParameters) -> Result<()> {
        self.settings.save_default_parameters(parameters).await
    }

    pub async fn history(&self) -> Result<History> {
        self.settings.history().await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.settings.clear_history().await
    }
}

pub struct BuilderServiceBuilder {
    settings: Option<Arc<dyn SettingsStore>>,
    secrets: Option<Arc<dyn SecretStore>>,
    factory: Option<Arc<dyn DataSourceFactory>>,
}

impl BuilderServiceBuilder {
    pub fn new() -> Self {
        Self {
            settings: None,
            secrets: None,
            factory: None,
        }
    }

    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    pub fn data_source_factory(mut self, factory: Arc<dyn DataSourceFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Secrets default to an in-memory store and the factory to the sqlx drivers
    pub fn build(self) -> Result<BuilderService> {
        let settings = self
            .settings
            .ok_or_else(|| Error::config_error("settings store is required"))?;
        let secrets = self
            .secrets
            .unwrap_or_else(|| Arc::new(InMemorySecretStore::new()));
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(SqlxDataSourceFactory::new()));

        Ok(BuilderService {
            settings,
            secrets,
            normalizer: MetadataNormalizer::new(factory),
        })
    }
}

impl Default for BuilderServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
