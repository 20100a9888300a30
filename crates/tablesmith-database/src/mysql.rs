//! MySQL metadata access
//!
//! MySQL exposes each database as a catalog and has no schema level.

use crate::dialect::Dialect;
use crate::source::{DataSource, MetadataConnection, MetadataFilter, TableRow, TableType};
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{ConnectOptions, Connection, Row};
use std::str::FromStr;
use tablesmith_core::{ColumnInfo, Error, Result};

const CATALOGS_QUERY: &str = r#"
    SELECT CAST(SCHEMA_NAME AS CHAR) AS name
    FROM information_schema.schemata
    ORDER BY SCHEMA_NAME
"#;

const TABLES_QUERY: &str = r#"
    SELECT
        CAST(TABLE_NAME AS CHAR) AS table_name,
        CAST(TABLE_TYPE AS CHAR) AS table_type,
        CAST(TABLE_COMMENT AS CHAR) AS remarks
    FROM information_schema.tables
    WHERE (? IS NULL OR TABLE_SCHEMA = ?)
    ORDER BY TABLE_SCHEMA, TABLE_NAME
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS column_name,
        UPPER(CAST(DATA_TYPE AS CHAR)) AS type_name,
        CAST(COLUMN_COMMENT AS CHAR) AS remarks
    FROM information_schema.columns
    WHERE (? IS NULL OR TABLE_SCHEMA = ?)
    AND TABLE_NAME = ?
    ORDER BY TABLE_SCHEMA, ORDINAL_POSITION
"#;

/// Data source for a MySQL server
pub struct MySqlDataSource {
    options: MySqlConnectOptions,
}

impl MySqlDataSource {
    pub fn new(url: &str, username: &str, password: Option<&str>) -> Result<Self> {
        let mut options = MySqlConnectOptions::from_str(url).map_err(Error::connection)?;
        if !username.is_empty() {
            options = options.username(username);
        }
        if let Some(password) = password {
            options = options.password(password);
        }
        Ok(Self { options })
    }
}

#[async_trait]
impl DataSource for MySqlDataSource {
    async fn connection(&self) -> Result<Box<dyn MetadataConnection>> {
        let conn = self.options.connect().await.map_err(Error::connection)?;
        Ok(Box::new(MySqlMetadataConnection { conn }))
    }
}

pub struct MySqlMetadataConnection {
    conn: MySqlConnection,
}

fn column(row: &MySqlRow, name: &str, label: &str) -> Result<Option<String>> {
    row.try_get(name).map_err(|e| Error::metadata_query(label, e))
}

#[async_trait]
impl MetadataConnection for MySqlMetadataConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Standard
    }

    async fn catalogs(&mut self) -> Result<Vec<String>> {
        let rows = sqlx::query(CATALOGS_QUERY)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("mysql catalogs", e))?;

        rows.iter()
            .map(|row| Ok(column(row, "name", "mysql catalogs")?.unwrap_or_default()))
            .collect()
    }

    async fn schemas(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn tables(&mut self, filter: &MetadataFilter) -> Result<Vec<TableRow>> {
        tracing::debug!(catalog = ?filter.catalog, "Listing MySQL tables");

        let rows = sqlx::query(TABLES_QUERY)
            .bind(filter.catalog.as_deref())
            .bind(filter.catalog.as_deref())
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("mysql tables", e))?;

        rows.iter()
            .map(|row| {
                let table_type = column(row, "table_type", "mysql tables")?.unwrap_or_default();
                Ok(TableRow {
                    name: column(row, "table_name", "mysql tables")?.unwrap_or_default(),
                    table_type: TableType::from_engine(&table_type),
                    remarks: column(row, "remarks", "mysql tables")?,
                })
            })
            .collect()
    }

    async fn columns(
        &mut self,
        filter: &MetadataFilter,
        table_name: &str,
    ) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(filter.catalog.as_deref())
            .bind(filter.catalog.as_deref())
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("mysql columns", e))?;

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    column_name: column(row, "column_name", "mysql columns")?.unwrap_or_default(),
                    column_type: column(row, "type_name", "mysql columns")?.unwrap_or_default(),
                    comment: column(row, "remarks", "mysql columns")?,
                })
            })
            .collect()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await.map_err(Error::connection)
    }
}
