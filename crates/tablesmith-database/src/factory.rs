//! sqlx-backed data source factory

use crate::mysql::MySqlDataSource;
use crate::postgres::PostgresDataSource;
use crate::source::{DataSource, DataSourceFactory};
use crate::sqlite::SqliteDataSource;
use crate::url;
use tablesmith_core::{ConnectionInfo, DriverType, Error, Result};

/// Builds data sources for the drivers sqlx supports.
///
/// Every connection it hands out is a fresh, unpooled connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlxDataSourceFactory;

impl SqlxDataSourceFactory {
    pub fn new() -> Self {
        Self
    }
}

impl DataSourceFactory for SqlxDataSourceFactory {
    fn data_source(&self, info: &ConnectionInfo) -> Result<Box<dyn DataSource>> {
        let url = url::resolve(info);
        let password = info.password.as_deref();

        tracing::debug!(
            connection_id = %info.id,
            driver = %info.driver_type,
            "Creating data source"
        );

        match info.driver_type {
            DriverType::Sqlite => Ok(Box::new(SqliteDataSource::new(&url)?)),
            DriverType::PostgreSql => Ok(Box::new(PostgresDataSource::new(
                &url,
                &info.username,
                password,
            )?)),
            DriverType::MySql => Ok(Box::new(MySqlDataSource::new(
                &url,
                &info.username,
                password,
            )?)),
            DriverType::Oracle => Err(Error::UnsupportedDriver(format!(
                "{} has no bundled driver, supply a custom DataSourceFactory",
                info.driver_type
            ))),
        }
    }
}
