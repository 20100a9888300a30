//! Tablesmith: database metadata browsing and code generation parameter staging
//!
//! Re-exports the workspace crates under one roof.

pub use tablesmith_core as core;
pub use tablesmith_database as database;
pub use tablesmith_service as service;
pub use tablesmith_settings as settings;
pub use tablesmith_telemetry as telemetry;

pub mod prelude {
    pub use tablesmith_core::{
        ColumnInfo, ConnectionInfo, DatabaseItem, DriverType, Error, GeneratorParamWrapper,
        History, HistoryCategory, ItemKind, Result, TableInfo, TablesmithConfig, TargetConfig,
    };
    pub use tablesmith_service::BuilderService;
    pub use tablesmith_settings::{SecretStore, SettingsStore};
}
