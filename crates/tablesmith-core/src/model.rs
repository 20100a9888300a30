//! Connection targets and the normalized schema tree

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Supported database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverType {
    MySql,
    PostgreSql,
    Sqlite,
    Oracle,
}

impl DriverType {
    pub const ALL: [DriverType; 4] = [
        DriverType::MySql,
        DriverType::PostgreSql,
        DriverType::Sqlite,
        DriverType::Oracle,
    ];

    /// URL template with `${host}`, `${port}` and `${db}` placeholders
    pub fn url_pattern(&self) -> &'static str {
        match self {
            DriverType::MySql => "mysql://${host}:${port}/${db}",
            DriverType::PostgreSql => "postgres://${host}:${port}/${db}",
            DriverType::Sqlite => "sqlite://${db}",
            DriverType::Oracle => "oracle://${host}:${port}/${db}",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DriverType::MySql => 3306,
            DriverType::PostgreSql => 5432,
            DriverType::Sqlite => 0,
            DriverType::Oracle => 1521,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriverType::MySql => "mysql",
            DriverType::PostgreSql => "postgresql",
            DriverType::Sqlite => "sqlite",
            DriverType::Oracle => "oracle",
        }
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DriverType::MySql),
            "postgresql" | "postgres" | "pg" => Ok(DriverType::PostgreSql),
            "sqlite" => Ok(DriverType::Sqlite),
            "oracle" => Ok(DriverType::Oracle),
            other => Err(Error::UnsupportedDriver(other.to_string())),
        }
    }
}

/// A named database target.
///
/// The password is never serialized: persisted copies are always
/// password-less and a decorated clone is produced for live operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub driver_type: DriverType,
    /// Explicit URL, used verbatim when non-blank
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(skip)]
    pub password: Option<String>,
}

impl ConnectionInfo {
    /// Create a connection target with a generated id and the driver's default port
    pub fn new(driver_type: DriverType) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            driver_type,
            url: None,
            host: String::new(),
            port: driver_type.default_port(),
            database: String::new(),
            username: String::new(),
            password: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password;
        self
    }

    /// The explicit URL when it holds more than whitespace
    pub fn explicit_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Copy of this record without its password, suitable for persisting
    pub fn without_password(&self) -> Self {
        Self {
            password: None,
            ..self.clone()
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Kind of a node in the discovered schema tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Database,
    Table,
}

/// A discovered database or table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseItem {
    pub kind: ItemKind,
    pub name: String,
    pub comment: Option<String>,
    /// Name of the owning database for tables
    pub parent: Option<String>,
}

impl DatabaseItem {
    pub fn database(name: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Database,
            name: name.into(),
            comment: None,
            parent: None,
        }
    }

    pub fn table(
        name: impl Into<String>,
        comment: Option<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            kind: ItemKind::Table,
            name: name.into(),
            comment,
            parent: Some(parent.into()),
        }
    }
}

/// Information about a table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    /// Type name as reported by the engine
    pub column_type: String,
    pub comment: Option<String>,
}

/// Per-column generation choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub column_name: String,
    pub property_name: Option<String>,
    pub target_type: Option<String>,
}

/// A table within a logical database.
///
/// Only `database` and `table_name` identify the table; the remaining
/// fields remember the choices made the last time code was generated for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub database: String,
    pub table_name: String,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub mapper_name: Option<String>,
    #[serde(default)]
    pub generated_key: Option<String>,
    #[serde(default)]
    pub ignored_columns: Vec<String>,
    #[serde(default)]
    pub column_overrides: Vec<ColumnOverride>,
}

impl TableInfo {
    pub fn new(database: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    pub fn same_table(&self, other: &TableInfo) -> bool {
        self.database == other.database && self.table_name == other.table_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_not_serialized() {
        let info = ConnectionInfo::new(DriverType::MySql)
            .with_id("c1")
            .with_credentials("root", Some("secret".to_string()));

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("secret"));

        let restored: ConnectionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.password, None);
        assert_eq!(restored.username, "root");
    }

    #[test]
    fn test_explicit_url_ignores_whitespace() {
        let info = ConnectionInfo::new(DriverType::PostgreSql).with_url("   ");
        assert_eq!(info.explicit_url(), None);

        let info = info.with_url("postgres://db/app");
        assert_eq!(info.explicit_url(), Some("postgres://db/app"));
    }

    #[test]
    fn test_driver_type_parsing() {
        assert_eq!("MySQL".parse::<DriverType>().unwrap(), DriverType::MySql);
        assert_eq!("pg".parse::<DriverType>().unwrap(), DriverType::PostgreSql);
        assert!("db2".parse::<DriverType>().is_err());

        for driver in DriverType::ALL {
            assert_eq!(driver.as_str().parse::<DriverType>().unwrap(), driver);
        }
    }

    #[test]
    fn test_table_identity_ignores_choices() {
        let mut remembered = TableInfo::new("shop", "orders");
        remembered.domain_name = Some("Order".to_string());

        assert!(remembered.same_table(&TableInfo::new("shop", "orders")));
        assert!(!remembered.same_table(&TableInfo::new("shop", "order_items")));
    }
}
