//! SQLite metadata access

use crate::dialect::Dialect;
use crate::source::{DataSource, MetadataConnection, MetadataFilter, TableRow, TableType};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};
use std::str::FromStr;
use tablesmith_core::{ColumnInfo, Error, Result};

/// Data source for a single SQLite file
pub struct SqliteDataSource {
    options: SqliteConnectOptions,
}

impl SqliteDataSource {
    pub fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url).map_err(Error::connection)?;
        Ok(Self { options })
    }
}

#[async_trait]
impl DataSource for SqliteDataSource {
    async fn connection(&self) -> Result<Box<dyn MetadataConnection>> {
        let conn = self.options.connect().await.map_err(Error::connection)?;
        Ok(Box::new(SqliteMetadataConnection { conn }))
    }
}

/// SQLite has no catalogs or schemas; filters are ignored
pub struct SqliteMetadataConnection {
    conn: SqliteConnection,
}

#[async_trait]
impl MetadataConnection for SqliteMetadataConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Embedded
    }

    async fn catalogs(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn schemas(&mut self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn tables(&mut self, _filter: &MetadataFilter) -> Result<Vec<TableRow>> {
        let query = r#"
            SELECT name, type
            FROM sqlite_master
            WHERE type IN ('table', 'view')
            ORDER BY name
        "#;

        let rows = sqlx::query(query)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("sqlite tables", e))?;

        rows.iter()
            .map(|row| {
                let name: String = row
                    .try_get("name")
                    .map_err(|e| Error::metadata_query("sqlite tables", e))?;
                let kind: String = row
                    .try_get("type")
                    .map_err(|e| Error::metadata_query("sqlite tables", e))?;

                let table_type = if name.starts_with("sqlite_") {
                    TableType::SystemTable
                } else {
                    TableType::from_engine(&kind)
                };

                Ok(TableRow {
                    name,
                    table_type,
                    remarks: None,
                })
            })
            .collect()
    }

    async fn columns(
        &mut self,
        _filter: &MetadataFilter,
        table_name: &str,
    ) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("sqlite columns", e))?;

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    column_name: row
                        .try_get("name")
                        .map_err(|e| Error::metadata_query("sqlite columns", e))?,
                    column_type: row
                        .try_get("type")
                        .map_err(|e| Error::metadata_query("sqlite columns", e))?,
                    comment: None,
                })
            })
            .collect()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await.map_err(Error::connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_file() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("shop.db").display());

        let mut conn = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true)
            .connect()
            .await
            .unwrap();
        sqlx::query("CREATE TABLE orders (id INTEGER PRIMARY KEY, total DECIMAL(10,2), note TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();
        sqlx::query("CREATE VIEW big_orders AS SELECT * FROM orders WHERE total > 100")
            .execute(&mut conn)
            .await
            .unwrap();
        conn.close().await.unwrap();

        (dir, url)
    }

    #[tokio::test]
    async fn test_sqlite_has_no_catalogs() {
        let (_dir, url) = seeded_file().await;
        let mut conn = SqliteDataSource::new(&url).unwrap().connection().await.unwrap();

        assert_eq!(conn.dialect(), Dialect::Embedded);
        assert!(conn.catalogs().await.unwrap().is_empty());
        assert!(conn.schemas().await.unwrap().is_empty());
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_tables_and_columns() {
        let (_dir, url) = seeded_file().await;
        let mut conn = SqliteDataSource::new(&url).unwrap().connection().await.unwrap();

        let tables = conn.tables(&MetadataFilter::default()).await.unwrap();
        let orders = tables.iter().find(|t| t.name == "orders").unwrap();
        assert_eq!(orders.table_type, TableType::Table);
        let view = tables.iter().find(|t| t.name == "big_orders").unwrap();
        assert_eq!(view.table_type, TableType::View);

        let columns = conn
            .columns(&MetadataFilter::default(), "orders")
            .await
            .unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, ["id", "total", "note"]);
        assert_eq!(columns[1].column_type, "DECIMAL(10,2)");

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_a_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("absent.db").display());

        let result = SqliteDataSource::new(&url).unwrap().connection().await;
        assert!(matches!(result, Err(Error::Connection { .. })));
    }
}
