//! Cross-dialect discovery of databases, tables and columns
//!
//! Every operation opens its own connection through the injected
//! [`DataSourceFactory`] and closes it before returning, whatever the outcome.

use crate::dialect::Dialect;
use crate::source::{DataSourceFactory, MetadataConnection, TableType};
use std::sync::Arc;
use tablesmith_core::{ColumnInfo, ConnectionInfo, DatabaseItem, Result, TableInfo};

/// Name of the database synthesized for engines without catalogs or schemas
pub const PLACEHOLDER_DATABASE: &str = "dummy";

pub struct MetadataNormalizer {
    factory: Arc<dyn DataSourceFactory>,
}

impl MetadataNormalizer {
    pub fn new(factory: Arc<dyn DataSourceFactory>) -> Self {
        Self { factory }
    }

    async fn open(&self, info: &ConnectionInfo) -> Result<Box<dyn MetadataConnection>> {
        let data_source = self.factory.data_source(info)?;
        data_source.connection().await
    }

    /// Open and immediately release a connection
    pub async fn test_connection(&self, info: &ConnectionInfo) -> Result<()> {
        let conn = self.open(info).await?;
        release(conn).await;
        Ok(())
    }

    pub async fn list_databases(&self, info: &ConnectionInfo) -> Result<Vec<DatabaseItem>> {
        let mut conn = self.open(info).await?;
        let result = discover_databases(conn.as_mut()).await;
        release(conn).await;

        tracing::debug!(
            connection_id = %info.id,
            found = result.as_ref().map(Vec::len).unwrap_or(0),
            "Listed databases"
        );
        result
    }

    pub async fn list_tables(
        &self,
        info: &ConnectionInfo,
        database: &str,
    ) -> Result<Vec<DatabaseItem>> {
        let mut conn = self.open(info).await?;
        let result = discover_tables(conn.as_mut(), database).await;
        release(conn).await;

        tracing::debug!(
            connection_id = %info.id,
            database = %database,
            found = result.as_ref().map(Vec::len).unwrap_or(0),
            "Listed tables"
        );
        result
    }

    pub async fn list_columns(
        &self,
        info: &ConnectionInfo,
        table: &TableInfo,
    ) -> Result<Vec<ColumnInfo>> {
        let mut conn = self.open(info).await?;
        let result = discover_columns(conn.as_mut(), table).await;
        release(conn).await;

        tracing::debug!(
            connection_id = %info.id,
            database = %table.database,
            table = %table.table_name,
            found = result.as_ref().map(Vec::len).unwrap_or(0),
            "Listed columns"
        );
        result
    }
}

async fn release(conn: Box<dyn MetadataConnection>) {
    if let Err(e) = conn.close().await {
        tracing::error!(error = %e, "Failed to close connection");
    }
}

fn non_blank(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .collect()
}

fn non_blank_comment(comment: Option<String>) -> Option<String> {
    comment.filter(|comment| !comment.trim().is_empty())
}

/// Catalogs first; schemas for schema-as-catalog engines; a placeholder for
/// embedded engines exposing neither.
pub async fn discover_databases(conn: &mut dyn MetadataConnection) -> Result<Vec<DatabaseItem>> {
    let dialect = conn.dialect();
    let mut names = non_blank(conn.catalogs().await?);

    if names.is_empty() && dialect.uses_schema_as_catalog() {
        names = non_blank(conn.schemas().await?);
    }

    if names.is_empty() && dialect == Dialect::Embedded {
        names.push(PLACEHOLDER_DATABASE.to_string());
    }

    Ok(names.into_iter().map(DatabaseItem::database).collect())
}

/// Base tables of `database`; views and system tables are skipped
pub async fn discover_tables(
    conn: &mut dyn MetadataConnection,
    database: &str,
) -> Result<Vec<DatabaseItem>> {
    let filter = conn.dialect().metadata_filter(database);
    let rows = conn.tables(&filter).await?;

    Ok(rows
        .into_iter()
        .filter(|row| row.table_type == TableType::Table)
        .map(|row| DatabaseItem::table(row.name, non_blank_comment(row.remarks), database))
        .collect())
}

pub async fn discover_columns(
    conn: &mut dyn MetadataConnection,
    table: &TableInfo,
) -> Result<Vec<ColumnInfo>> {
    let filter = conn.dialect().metadata_filter(&table.database);
    let columns = conn.columns(&filter, &table.table_name).await?;

    Ok(columns
        .into_iter()
        .map(|column| ColumnInfo {
            comment: non_blank_comment(column.comment),
            ..column
        })
        .collect())
}
