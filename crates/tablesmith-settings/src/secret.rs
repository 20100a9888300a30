//! Connection password storage

use super::*;
use std::collections::HashMap;
use std::env;
use std::sync::RwLock;
use tablesmith_core::Error;

pub const PASSWORD_ENV_PREFIX: &str = "TABLESMITH_PASSWORD_";

/// Passwords held in process memory, keyed by connection id
#[derive(Default)]
pub struct InMemorySecretStore {
    passwords: RwLock<HashMap<String, String>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn connection_password(&self, info: &ConnectionInfo) -> Result<Option<String>> {
        let passwords = self
            .passwords
            .read()
            .map_err(|_| Error::Secret("secret lock poisoned".to_string()))?;
        Ok(passwords.get(&info.id).cloned())
    }

    async fn save_connection_password(&self, info: &ConnectionInfo, password: &str) -> Result<()> {
        let mut passwords = self
            .passwords
            .write()
            .map_err(|_| Error::Secret("secret lock poisoned".to_string()))?;
        passwords.insert(info.id.clone(), password.to_string());
        Ok(())
    }

    async fn remove_connection_password(&self, connection_id: &str) -> Result<()> {
        let mut passwords = self
            .passwords
            .write()
            .map_err(|_| Error::Secret("secret lock poisoned".to_string()))?;
        passwords.remove(connection_id);
        Ok(())
    }
}

/// Read-only passwords from `TABLESMITH_PASSWORD_<ID>` environment variables.
///
/// The id is upper-cased and every character outside `[A-Z0-9]` becomes `_`,
/// so connection `local-mysql` reads `TABLESMITH_PASSWORD_LOCAL_MYSQL`.
/// Ids differing only in case or punctuation (`local-mysql`, `Local_MySQL`)
/// map to the same variable and therefore share a password; callers adding
/// connections should reject such ids with [`EnvSecretStore::collides`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    pub fn variable_name(info: &ConnectionInfo) -> String {
        let suffix: String = info
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", PASSWORD_ENV_PREFIX, suffix)
    }

    /// Whether two distinct connections would read the same variable
    pub fn collides(a: &ConnectionInfo, b: &ConnectionInfo) -> bool {
        a.id != b.id && Self::variable_name(a) == Self::variable_name(b)
    }
}

#[async_trait]
impl SecretStore for EnvSecretStore {
    async fn connection_password(&self, info: &ConnectionInfo) -> Result<Option<String>> {
        match env::var(Self::variable_name(info)) {
            Ok(password) => Ok(Some(password)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(Error::Secret(format!(
                "{}: {}",
                Self::variable_name(info),
                e
            ))),
        }
    }

    async fn save_connection_password(&self, info: &ConnectionInfo, _password: &str) -> Result<()> {
        Err(Error::Secret(format!(
            "environment secret store is read-only, set {} instead",
            Self::variable_name(info)
        )))
    }

    /// Nothing is stored, so there is nothing to remove
    async fn remove_connection_password(&self, _connection_id: &str) -> Result<()> {
        Ok(())
    }
}
