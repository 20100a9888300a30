// Integration tests for Tablesmith
// These tests drive the full stack against a real SQLite file and JSON settings

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tablesmith_workspace::prelude::*;
use tablesmith_workspace::settings::{InMemorySecretStore, JsonFileSettingsStore};

async fn create_shop_db(path: &Path) -> anyhow::Result<()> {
    let url = format!("sqlite://{}", path.display());
    let mut conn = SqliteConnectOptions::from_str(&url)?
        .create_if_missing(true)
        .connect()
        .await?;

    for statement in [
        "CREATE TABLE customers (id INTEGER PRIMARY KEY, email TEXT NOT NULL)",
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER, total REAL)",
        "CREATE VIEW order_totals AS SELECT customer_id, SUM(total) AS total FROM orders GROUP BY customer_id",
    ] {
        sqlx::query(statement).execute(&mut conn).await?;
    }

    conn.close().await?;
    Ok(())
}

fn shop_connection(db_path: &Path) -> ConnectionInfo {
    ConnectionInfo::new(DriverType::Sqlite)
        .with_id("shop")
        .with_name("Shop")
        .with_database(db_path.display().to_string())
}

#[tokio::test]
async fn test_browse_and_stage_from_config() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("shop.db");
    create_shop_db(&db_path).await?;

    let settings_path = dir.path().join("state").join("settings.json");
    let config = TablesmithConfig::parse(&format!(
        "[settings]\npath = \"{}\"\nmax_history = 5\n",
        settings_path.display()
    ))?;
    let service = BuilderService::from_config(&config);

    service
        .save_connection_infos(vec![shop_connection(&db_path)])
        .await?;
    assert!(settings_path.exists());

    let databases = service.fetch_databases("shop").await?;
    assert_eq!(databases.len(), 1);
    assert_eq!(databases[0].name, "dummy");
    assert_eq!(databases[0].kind, ItemKind::Database);

    let tables = service.fetch_tables("shop", "dummy").await?;
    let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["customers", "orders"]);
    assert!(tables.iter().all(|t| t.parent.as_deref() == Some("dummy")));

    let columns = service
        .fetch_columns("shop", &TableInfo::new("dummy", "orders"))
        .await?;
    let columns: Vec<_> = columns
        .iter()
        .map(|c| (c.column_name.as_str(), c.column_type.as_str()))
        .collect();
    assert_eq!(
        columns,
        [("id", "INTEGER"), ("customer_id", "INTEGER"), ("total", "REAL")]
    );

    let mut orders = TableInfo::new("dummy", "orders");
    orders.domain_name = Some("Order".to_string());
    let mut params = GeneratorParamWrapper::new(vec![orders.clone()]);
    params.connection_id = Some("shop".to_string());
    params.model_config = Some(TargetConfig::new("app", "com.example.model"));

    service.stash_generator_params(params.clone()).await?;
    service.stash_generator_params(params.clone()).await?;

    // A fresh service over the same file sees everything that was staged
    let reopened = BuilderService::from_config(&config);
    assert_eq!(reopened.last_generator_params().await?, Some(params));
    assert_eq!(
        reopened
            .last_table_info(&TableInfo::new("dummy", "orders"))
            .await?,
        Some(orders)
    );
    assert_eq!(
        reopened.history().await?.get(HistoryCategory::ModelPackage),
        ["com.example.model"]
    );

    reopened.clear_history().await?;
    let history = service.history().await?;
    for category in HistoryCategory::ALL {
        assert!(history.get(category).is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn test_passwords_never_reach_settings_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let settings_path = dir.path().join("settings.json");
    let secrets = Arc::new(InMemorySecretStore::new());

    let service = BuilderService::builder()
        .settings(Arc::new(JsonFileSettingsStore::new(&settings_path)))
        .secrets(secrets.clone())
        .build()?;

    let info = ConnectionInfo::new(DriverType::PostgreSql)
        .with_id("warehouse")
        .with_host("db.internal", 5432)
        .with_database("analytics")
        .with_credentials("reporter", Some("hunter2".to_string()));
    service.save_connection_infos(vec![info]).await?;

    let contents = std::fs::read_to_string(&settings_path)?;
    assert!(contents.contains("warehouse"));
    assert!(!contents.contains("hunter2"));

    let stored = service.load_connection_infos().await?;
    assert_eq!(stored[0].password, None);

    let decorated = service.connection_info_with_password("warehouse").await?;
    assert_eq!(decorated.password.as_deref(), Some("hunter2"));
    assert_eq!(decorated.without_password(), stored[0]);

    Ok(())
}

#[tokio::test]
async fn test_history_is_bounded() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let service = BuilderService::builder()
        .settings(Arc::new(
            JsonFileSettingsStore::new(dir.path().join("settings.json")).with_max_history(2),
        ))
        .build()?;

    for package in ["com.a", "com.b", "com.c"] {
        let mut params = GeneratorParamWrapper::new(vec![TableInfo::new("db", "t")]);
        params.client_config = Some(TargetConfig::package(package));
        service.stash_generator_params(params).await?;
    }

    let history = service.history().await?;
    assert_eq!(history.get(HistoryCategory::ClientPackage), ["com.c", "com.b"]);

    Ok(())
}

#[tokio::test]
async fn test_unknown_connection_and_bad_database() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let service = BuilderService::builder()
        .settings(Arc::new(JsonFileSettingsStore::new(
            dir.path().join("settings.json"),
        )))
        .build()?;

    let err = service.fetch_tables("nope", "dummy").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionNotFound(_)));
    assert!(
        err.to_string()
            .contains("Connection name not found, please add it first")
    );

    let missing = ConnectionInfo::new(DriverType::Sqlite)
        .with_database(dir.path().join("absent").join("none.db").display().to_string());
    let err = service.test_connection(&missing).await.unwrap_err();
    assert!(err.is_database_access());

    Ok(())
}
