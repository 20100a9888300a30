//! Span creation helpers for metadata and staging operations

use crate::attributes::*;
use tablesmith_core::ConnectionInfo;

/// Attributes for tracing an operation against one connection target
#[derive(Debug, Clone)]
pub struct OperationSpanAttributes {
    pub operation: &'static str,
    pub connection_id: String,
    pub driver: String,
    pub database: Option<String>,
    pub table: Option<String>,
}

impl OperationSpanAttributes {
    pub fn new(operation: &'static str, info: &ConnectionInfo) -> Self {
        Self {
            operation,
            connection_id: info.id.clone(),
            driver: info.driver_type.to_string(),
            database: None,
            table: None,
        }
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

/// Span covering one database operation (connection test, database, table
/// or column listing). Attach it with `tracing::Instrument`.
pub fn operation_span(attrs: OperationSpanAttributes) -> tracing::Span {
    let span = tracing::info_span!(
        "db_operation",
        { TABLESMITH_OPERATION } = attrs.operation,
        { TABLESMITH_CONNECTION_ID } = %attrs.connection_id,
        { DB_SYSTEM } = %attrs.driver,
        { DB_NAME } = tracing::field::Empty,
        { DB_SQL_TABLE } = tracing::field::Empty,
    );

    if let Some(database) = &attrs.database {
        span.record(DB_NAME, database.as_str());
    }
    if let Some(table) = &attrs.table {
        span.record(DB_SQL_TABLE, table.as_str());
    }

    span
}

/// Span covering the staging of one generation parameter bundle
pub fn stage_span(table_count: usize) -> tracing::Span {
    tracing::info_span!(
        "stage_generator_params",
        { TABLESMITH_OPERATION } = "stage",
        { TABLESMITH_TABLE_COUNT } = table_count,
    )
}
