use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to database: {source}")]
    Connection {
        #[source]
        source: anyhow::Error,
    },

    #[error("Metadata query '{query}' failed: {source}")]
    MetadataQuery {
        query: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Connection name not found, please add it first: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),

    #[error("Secret store error: {0}")]
    Secret(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wrap a driver error raised while opening a connection
    ///
    /// # Example
    /// ```
    /// use tablesmith_core::Error;
    /// let err = Error::connection(std::io::Error::other("refused"));
    /// assert!(err.to_string().contains("refused"));
    /// ```
    pub fn connection<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Connection {
            source: anyhow::Error::new(err),
        }
    }

    /// Wrap a driver error raised by a catalog, schema, table or column query
    pub fn metadata_query<E>(query: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::MetadataQuery {
            query: query.into(),
            source: anyhow::Error::new(err),
        }
    }

    /// Helper for creating configuration errors
    ///
    /// # Example
    /// ```
    /// use tablesmith_core::Error;
    /// let err = Error::config_error("max_history must be positive");
    /// ```
    pub fn config_error(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// True for failures raised while talking to a database, as opposed to
    /// local settings or configuration problems
    pub fn is_database_access(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. } | Error::MetadataQuery { .. } | Error::UnsupportedDriver(_)
        )
    }
}
