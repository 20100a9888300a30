//! Engine-specific metadata behavior

use crate::source::MetadataFilter;
use tablesmith_core::DriverType;

/// How an engine maps logical databases onto catalogs and schemas.
///
/// Carried by every [`MetadataConnection`](crate::MetadataConnection) from
/// the moment it is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Logical databases are catalogs
    Standard,
    /// Logical databases are schemas; the catalog is not used (Oracle)
    SchemaAsCatalog,
    /// Single-file engine with neither catalogs nor schemas (SQLite)
    Embedded,
}

impl Dialect {
    pub fn for_driver(driver_type: DriverType) -> Self {
        match driver_type {
            DriverType::Oracle => Dialect::SchemaAsCatalog,
            DriverType::Sqlite => Dialect::Embedded,
            DriverType::MySql | DriverType::PostgreSql => Dialect::Standard,
        }
    }

    pub fn uses_schema_as_catalog(&self) -> bool {
        matches!(self, Dialect::SchemaAsCatalog)
    }

    /// Table and column query filter selecting the logical `database`
    pub fn metadata_filter(&self, database: &str) -> MetadataFilter {
        if self.uses_schema_as_catalog() {
            MetadataFilter {
                catalog: None,
                schema: Some(database.to_string()),
            }
        } else {
            MetadataFilter {
                catalog: Some(database.to_string()),
                schema: None,
            }
        }
    }
}

impl From<DriverType> for Dialect {
    fn from(driver_type: DriverType) -> Self {
        Dialect::for_driver(driver_type)
    }
}
