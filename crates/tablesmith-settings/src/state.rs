//! The persisted settings document

use serde::{Deserialize, Serialize};
use tablesmith_core::{
    ConnectionInfo, DefaultParameters, GeneratorParamWrapper, History, TableInfo,
};

/// Everything a settings store persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connections: Vec<ConnectionInfo>,
    #[serde(default)]
    pub last_generator_params: Option<GeneratorParamWrapper>,
    #[serde(default)]
    pub table_infos: Vec<TableInfo>,
    #[serde(default)]
    pub history: History,
    #[serde(default)]
    pub default_parameters: DefaultParameters,
}

impl Settings {
    /// Replace the connection list, dropping any password
    pub fn set_connections(&mut self, connections: Vec<ConnectionInfo>) {
        self.connections = connections
            .iter()
            .map(ConnectionInfo::without_password)
            .collect();
    }

    /// Insert or replace records keyed by database and table name
    pub fn upsert_table_infos(&mut self, tables: Vec<TableInfo>) {
        for table in tables {
            match self.table_infos.iter_mut().find(|t| t.same_table(&table)) {
                Some(existing) => *existing = table,
                None => self.table_infos.push(table),
            }
        }
    }

    pub fn table_info(&self, key: &TableInfo) -> Option<TableInfo> {
        self.table_infos.iter().find(|t| t.same_table(key)).cloned()
    }
}
