//! Data source and metadata connection abstractions

use async_trait::async_trait;
use tablesmith_core::{ColumnInfo, ConnectionInfo, Result};

use crate::dialect::Dialect;

/// Catalog and schema constraints for table and column queries.
/// `None` leaves that level unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

/// Table kinds as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    Table,
    View,
    SystemTable,
    Other,
}

impl TableType {
    /// Map an engine-reported table type name
    pub fn from_engine(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "TABLE" | "BASE TABLE" => TableType::Table,
            "VIEW" | "MATERIALIZED VIEW" => TableType::View,
            "SYSTEM TABLE" | "SYSTEM VIEW" => TableType::SystemTable,
            _ => TableType::Other,
        }
    }
}

/// A raw row from a table listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub name: String,
    pub table_type: TableType,
    pub remarks: Option<String>,
}

/// An open connection able to answer metadata queries
#[async_trait]
pub trait MetadataConnection: Send {
    fn dialect(&self) -> Dialect;

    /// Catalog names, possibly including blank entries
    async fn catalogs(&mut self) -> Result<Vec<String>>;

    /// Schema names, possibly including blank entries
    async fn schemas(&mut self) -> Result<Vec<String>>;

    /// Tables of every type matching `filter`
    async fn tables(&mut self, filter: &MetadataFilter) -> Result<Vec<TableRow>>;

    /// Columns of `table_name` in driver order
    async fn columns(
        &mut self,
        filter: &MetadataFilter,
        table_name: &str,
    ) -> Result<Vec<ColumnInfo>>;

    async fn close(self: Box<Self>) -> Result<()>;
}

/// A connection-capable handle for one resolved connection target
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn connection(&self) -> Result<Box<dyn MetadataConnection>>;
}

/// Builds data sources for connection targets
pub trait DataSourceFactory: Send + Sync {
    fn data_source(&self, info: &ConnectionInfo) -> Result<Box<dyn DataSource>>;
}
