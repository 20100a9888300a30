//! PostgreSQL metadata access
//!
//! Every database on the server is a catalog. A connection only sees the
//! tables of the database it is bound to, so table and column listings for
//! another catalog reconnect to that database first.

use crate::dialect::Dialect;
use crate::source::{DataSource, MetadataConnection, MetadataFilter, TableRow, TableType};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{ConnectOptions, Connection, Row};
use std::str::FromStr;
use tablesmith_core::{ColumnInfo, Error, Result};

const CATALOGS_QUERY: &str = r#"
    SELECT datname::text AS name
    FROM pg_catalog.pg_database
    WHERE datallowconn
    AND NOT datistemplate
    AND has_database_privilege(datname, 'CONNECT')
    ORDER BY datname
"#;

const SCHEMAS_QUERY: &str = r#"
    SELECT nspname::text AS name
    FROM pg_catalog.pg_namespace
    ORDER BY nspname
"#;

const TABLES_QUERY: &str = r#"
    SELECT
        c.relname::text AS table_name,
        CASE
            WHEN n.nspname IN ('pg_catalog', 'information_schema')
                OR n.nspname LIKE 'pg\_toast%' THEN 'SYSTEM TABLE'
            WHEN c.relkind IN ('r', 'p') THEN 'TABLE'
            WHEN c.relkind IN ('v', 'm') THEN 'VIEW'
            ELSE 'OTHER'
        END AS table_type,
        obj_description(c.oid, 'pg_class') AS remarks
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind IN ('r', 'p', 'v', 'm', 'f')
    AND ($1::text IS NULL OR current_database() = $1)
    AND ($2::text IS NULL OR n.nspname = $2)
    ORDER BY n.nspname, c.relname
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        a.attname::text AS column_name,
        t.typname::text AS type_name,
        col_description(c.oid, a.attnum) AS remarks
    FROM pg_catalog.pg_attribute a
    JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
    WHERE a.attnum > 0
    AND NOT a.attisdropped
    AND c.relname = $3
    AND ($1::text IS NULL OR current_database() = $1)
    AND ($2::text IS NULL OR n.nspname = $2)
    ORDER BY n.nspname, a.attnum
"#;

/// Data source for a PostgreSQL server
pub struct PostgresDataSource {
    options: PgConnectOptions,
}

impl PostgresDataSource {
    pub fn new(url: &str, username: &str, password: Option<&str>) -> Result<Self> {
        let mut options = PgConnectOptions::from_str(url).map_err(Error::connection)?;
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
impl DataSource for PostgresDataSource {
    async fn connection(&self) -> Result<Box<dyn MetadataConnection>> {
        let conn = self.options.connect().await.map_err(Error::connection)?;
        Ok(Box::new(PostgresMetadataConnection {
            conn,
            options: self.options.clone(),
            database: None,
        }))
    }
}

pub struct PostgresMetadataConnection {
    conn: PgConnection,
    options: PgConnectOptions,
    /// Database `conn` is bound to, once known
    database: Option<String>,
}

/// The database to reconnect to, if `requested` differs from `current`
fn database_switch<'a>(current: &str, requested: Option<&'a str>) -> Option<&'a str> {
    requested.filter(|requested| *requested != current)
}

impl PostgresMetadataConnection {
    async fn current_database(&mut self) -> Result<String> {
        if let Some(database) = &self.database {
            return Ok(database.clone());
        }

        let database: String = sqlx::query_scalar("SELECT current_database()::text")
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("postgres current database", e))?;
        self.database = Some(database.clone());
        Ok(database)
    }

    /// Rebind the connection to the catalog named by `filter`
    async fn use_catalog(&mut self, filter: &MetadataFilter) -> Result<()> {
        let current = self.current_database().await?;
        let Some(target) = database_switch(&current, filter.catalog.as_deref()) else {
            return Ok(());
        };

        tracing::debug!(from = %current, to = %target, "Switching PostgreSQL database");
        let conn = self
            .options
            .clone()
            .database(target)
            .connect()
            .await
            .map_err(Error::connection)?;

        let previous = std::mem::replace(&mut self.conn, conn);
        self.database = Some(target.to_string());
        if let Err(e) = previous.close().await {
            tracing::error!(database = %current, error = %e, "Failed to close connection");
        }
        Ok(())
    }

    async fn names(&mut self, query: &str, label: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(query)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query(label, e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("name")
                    .map_err(|e| Error::metadata_query(label, e))
            })
            .collect()
    }
}

fn column(row: &PgRow, name: &str, label: &str) -> Result<Option<String>> {
    row.try_get(name).map_err(|e| Error::metadata_query(label, e))
}

#[async_trait]
impl MetadataConnection for PostgresMetadataConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Standard
    }

    async fn catalogs(&mut self) -> Result<Vec<String>> {
        self.names(CATALOGS_QUERY, "postgres catalogs").await
    }

    async fn schemas(&mut self) -> Result<Vec<String>> {
        self.names(SCHEMAS_QUERY, "postgres schemas").await
    }

    async fn tables(&mut self, filter: &MetadataFilter) -> Result<Vec<TableRow>> {
        tracing::debug!(
            catalog = ?filter.catalog,
            schema = ?filter.schema,
            "Listing PostgreSQL tables"
        );
        self.use_catalog(filter).await?;

        let rows = sqlx::query(TABLES_QUERY)
            .bind(filter.catalog.as_deref())
            .bind(filter.schema.as_deref())
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("postgres tables", e))?;

        rows.iter()
            .map(|row| {
                let table_type = column(row, "table_type", "postgres tables")?.unwrap_or_default();
                Ok(TableRow {
                    name: column(row, "table_name", "postgres tables")?.unwrap_or_default(),
                    table_type: TableType::from_engine(&table_type),
                    remarks: column(row, "remarks", "postgres tables")?,
                })
            })
            .collect()
    }

    async fn columns(
        &mut self,
        filter: &MetadataFilter,
        table_name: &str,
    ) -> Result<Vec<ColumnInfo>> {
        self.use_catalog(filter).await?;

        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(filter.catalog.as_deref())
            .bind(filter.schema.as_deref())
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| Error::metadata_query("postgres columns", e))?;

        rows.iter()
            .map(|row| {
                Ok(ColumnInfo {
                    column_name: column(row, "column_name", "postgres columns")?
                        .unwrap_or_default(),
                    column_type: column(row, "type_name", "postgres columns")?.unwrap_or_default(),
                    comment: column(row, "remarks", "postgres columns")?,
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

    const LIVE_URL_VAR: &str = "TABLESMITH_TEST_PG_URL";

    #[test]
    fn test_credentials_override_url() {
        let source =
            PostgresDataSource::new("postgres://localhost:5432/app", "reader", Some("pw")).unwrap();
        assert_eq!(source.options.get_username(), "reader");
        assert_eq!(source.options.get_database(), Some("app"));
    }

    #[test]
    fn test_invalid_url_is_a_connection_error() {
        let result = PostgresDataSource::new("not a url", "", None);
        assert!(matches!(result, Err(Error::Connection { .. })));
    }

    #[test]
    fn test_database_switch() {
        assert_eq!(database_switch("shop", Some("crm")), Some("crm"));
        assert_eq!(database_switch("shop", Some("shop")), None);
        assert_eq!(database_switch("shop", None), None);
    }

    async fn seed_database(base: &PgConnectOptions, name: &str, statements: &[&str]) {
        let mut admin = base.connect().await.unwrap();
        sqlx::query(&format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", name))
            .execute(&mut admin)
            .await
            .unwrap();
        sqlx::query(&format!("CREATE DATABASE {}", name))
            .execute(&mut admin)
            .await
            .unwrap();
        admin.close().await.unwrap();

        let mut conn = base.clone().database(name).connect().await.unwrap();
        for statement in statements {
            sqlx::query(statement).execute(&mut conn).await.unwrap();
        }
        conn.close().await.unwrap();
    }

    fn table_names(rows: &[TableRow]) -> Vec<&str> {
        rows.iter()
            .filter(|row| row.table_type == TableType::Table)
            .map(|row| row.name.as_str())
            .collect()
    }

    #[tokio::test]
    #[ignore] // Optional test - run with: TABLESMITH_TEST_PG_URL=postgres://... cargo test -- --ignored
    async fn test_live_metadata_across_databases() {
        let Ok(url) = std::env::var(LIVE_URL_VAR) else {
            eprintln!("{} not set, skipping", LIVE_URL_VAR);
            return;
        };
        let base = PgConnectOptions::from_str(&url).unwrap();

        seed_database(
            &base,
            "tablesmith_it_shop",
            &[
                "CREATE TABLE orders (id BIGINT PRIMARY KEY, customer TEXT, total NUMERIC)",
                "COMMENT ON TABLE orders IS 'Customer orders'",
                "COMMENT ON COLUMN orders.total IS 'Gross amount'",
                "CREATE VIEW big_orders AS SELECT * FROM orders WHERE total > 100",
            ],
        )
        .await;
        seed_database(
            &base,
            "tablesmith_it_crm",
            &["CREATE TABLE leads (id BIGINT PRIMARY KEY, email TEXT)"],
        )
        .await;

        let source = PostgresDataSource {
            options: base.clone().database("tablesmith_it_shop"),
        };
        let mut conn = source.connection().await.unwrap();

        let catalogs = conn.catalogs().await.unwrap();
        assert!(catalogs.iter().any(|name| name == "tablesmith_it_shop"));
        assert!(catalogs.iter().any(|name| name == "tablesmith_it_crm"));

        let shop_filter = Dialect::Standard.metadata_filter("tablesmith_it_shop");
        let shop = conn.tables(&shop_filter).await.unwrap();
        assert_eq!(table_names(&shop), ["orders"]);
        let orders = shop.iter().find(|row| row.name == "orders").unwrap();
        assert_eq!(orders.remarks.as_deref(), Some("Customer orders"));
        let view = shop.iter().find(|row| row.name == "big_orders").unwrap();
        assert_eq!(view.table_type, TableType::View);

        let columns = conn.columns(&shop_filter, "orders").await.unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, ["id", "customer", "total"]);
        assert_eq!(columns[0].column_type, "int8");
        assert_eq!(columns[2].comment.as_deref(), Some("Gross amount"));

        // Listed catalogs other than the bound database are browsable too
        let crm_filter = Dialect::Standard.metadata_filter("tablesmith_it_crm");
        let crm = conn.tables(&crm_filter).await.unwrap();
        assert_eq!(table_names(&crm), ["leads"]);

        let columns = conn.columns(&crm_filter, "leads").await.unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.column_name.as_str()).collect();
        assert_eq!(names, ["id", "email"]);

        conn.close().await.unwrap();
    }
}
