//! Core types for Tablesmith
//!
//! This crate provides the data model shared by the connection resolver,
//! the metadata normalizer and the generation parameter pipeline.

pub mod config;
pub mod error;
pub mod generator;
pub mod history;
pub mod model;

// Re-exports
pub use config::{ObservabilityConfig, SettingsConfig, TablesmithConfig};
pub use error::{Error, Result};
pub use generator::{DefaultParameters, GeneratorParamWrapper, TargetConfig};
pub use history::{DEFAULT_MAX_HISTORY, History, HistoryCategory};
pub use model::{
    ColumnInfo, ColumnOverride, ConnectionInfo, DatabaseItem, DriverType, ItemKind, TableInfo,
};
