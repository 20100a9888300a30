//! Settings and credential persistence for Tablesmith

use async_trait::async_trait;
use tablesmith_core::{
    ConnectionInfo, DefaultParameters, GeneratorParamWrapper, History, HistoryCategory, Result,
    TableInfo,
};

pub mod file;
pub mod inmemory;
pub mod secret;
pub mod state;

pub use file::JsonFileSettingsStore;
pub use inmemory::InMemorySettingsStore;
pub use secret::{EnvSecretStore, InMemorySecretStore};
pub use state::Settings;

/// Settings store trait
///
/// Implementations serialize their own writes.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Persisted connection targets, without passwords
    async fn connection_infos(&self) -> Result<Vec<ConnectionInfo>>;
    async fn save_connection_infos(&self, connections: Vec<ConnectionInfo>) -> Result<()>;

    async fn last_generator_params(&self) -> Result<Option<GeneratorParamWrapper>>;
    async fn save_last_generator_params(&self, params: GeneratorParamWrapper) -> Result<()>;

    /// Insert or replace table records keyed by database and table name
    async fn save_table_infos(&self, tables: Vec<TableInfo>) -> Result<()>;
    async fn table_info(&self, key: &TableInfo) -> Result<Option<TableInfo>>;

    async fn add_history(&self, category: HistoryCategory, value: &str) -> Result<()>;
    async fn history(&self) -> Result<History>;
    async fn clear_history(&self) -> Result<()>;

    async fn default_parameters(&self) -> Result<DefaultParameters>;
    async fn save_default_parameters(&self, parameters: DefaultParameters) -> Result<()>;
}

/// Secret store trait for connection passwords
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn connection_password(&self, info: &ConnectionInfo) -> Result<Option<String>>;
    async fn save_connection_password(&self, info: &ConnectionInfo, password: &str) -> Result<()>;
    /// Forget the password of a connection that no longer exists
    async fn remove_connection_password(&self, connection_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory::InMemorySettingsStore;
    use tablesmith_core::{DriverType, TargetConfig};

    #[tokio::test]
    async fn test_save_and_load_connections() {
        let store = InMemorySettingsStore::new();
        let info = ConnectionInfo::new(DriverType::MySql)
            .with_id("local")
            .with_credentials("root", Some("secret".to_string()));

        store.save_connection_infos(vec![info]).await.unwrap();

        let loaded = store.connection_infos().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "local");
        assert_eq!(loaded[0].password, None);
    }

    #[tokio::test]
    async fn test_table_info_lookup() {
        let store = InMemorySettingsStore::new();
        let mut orders = TableInfo::new("shop", "orders");
        orders.ignored_columns = vec!["legacy_flag".to_string()];

        store.save_table_infos(vec![orders.clone()]).await.unwrap();

        let found = store
            .table_info(&TableInfo::new("shop", "orders"))
            .await
            .unwrap();
        assert_eq!(found, Some(orders));
        assert!(
            store
                .table_info(&TableInfo::new("shop", "customers"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_history_append_and_clear() {
        let store = InMemorySettingsStore::new();

        store
            .add_history(HistoryCategory::ModelPackage, "com.example.model")
            .await
            .unwrap();
        store
            .add_history(HistoryCategory::ModelPackage, "com.example.model")
            .await
            .unwrap();

        let history = store.history().await.unwrap();
        assert_eq!(history.get(HistoryCategory::ModelPackage), ["com.example.model"]);

        store.clear_history().await.unwrap();
        let history = store.history().await.unwrap();
        for category in HistoryCategory::ALL {
            assert!(history.get(category).is_empty());
        }
    }

    #[tokio::test]
    async fn test_default_parameters_are_copies() {
        let store = InMemorySettingsStore::new();
        let mut defaults = store.default_parameters().await.unwrap();
        defaults.model_config = TargetConfig::new("src/main/java", "com.example.model");

        assert_eq!(store.default_parameters().await.unwrap(), DefaultParameters::default());

        store.save_default_parameters(defaults.clone()).await.unwrap();
        assert_eq!(store.default_parameters().await.unwrap(), defaults);
    }
}
