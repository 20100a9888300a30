//! Database access for Tablesmith
//!
//! This crate resolves connection URLs and normalizes catalog, schema, table
//! and column metadata across SQLite, PostgreSQL and MySQL, with an open
//! [`DataSourceFactory`] seam for other engines.

pub mod dialect;
pub mod factory;
pub mod mysql;
pub mod normalizer;
pub mod postgres;
pub mod source;
pub mod sqlite;
pub mod url;

// Re-exports
pub use dialect::Dialect;
pub use factory::SqlxDataSourceFactory;
pub use normalizer::{MetadataNormalizer, PLACEHOLDER_DATABASE};
pub use source::{
    DataSource, DataSourceFactory, MetadataConnection, MetadataFilter, TableRow, TableType,
};
pub use url::{expand_pattern, resolve};
