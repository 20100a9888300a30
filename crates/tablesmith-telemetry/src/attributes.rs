//! Span attribute names

pub const TABLESMITH_OPERATION: &str = "tablesmith.operation";
pub const TABLESMITH_CONNECTION_ID: &str = "tablesmith.connection.id";
pub const TABLESMITH_TABLE_COUNT: &str = "tablesmith.table.count";

// OpenTelemetry database semantic conventions
pub const DB_SYSTEM: &str = "db.system";
pub const DB_NAME: &str = "db.name";
pub const DB_SQL_TABLE: &str = "db.sql.table";
