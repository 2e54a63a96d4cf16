//! Resolved settings shared by the commands

use std::time::Duration;

use miette::Result;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::core::{
    is_admin_user, resolve_permission, ArangoClient, ArangoStore, Config, DocumentStore,
    HttpPermissionSource, Permission, SqliteStore, StoreKind,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Effective configuration after files, environment and flags
pub struct Context {
    pub config: Config,
    pub quiet: bool,
}

impl Context {
    pub fn new(global: &GlobalOpts) -> Self {
        let mut config = Config::load();
        config.merge(global.overrides());
        Self::with_config(config, global.quiet)
    }

    pub fn with_config(config: Config, quiet: bool) -> Self {
        Self { config, quiet }
    }

    pub fn client(&self) -> Result<ArangoClient> {
        ArangoClient::new(
            self.config.endpoint(),
            self.config.database(),
            self.config.auth(),
            Some(REQUEST_TIMEOUT),
        )
        .map_err(|e| miette::miette!("{}", e))
    }

    /// Open the configured document store
    pub fn open_store(&self) -> Result<Box<dyn DocumentStore>> {
        match self.config.store() {
            StoreKind::Arango => {
                debug!(
                    endpoint = self.config.endpoint(),
                    database = self.config.database(),
                    "using arango store"
                );
                Ok(Box::new(ArangoStore::new(self.client()?)))
            }
            StoreKind::Sqlite => {
                let path = self.config.store_path();
                debug!(path = %path.display(), "using sqlite store");
                let store = SqliteStore::open(&path).map_err(|e| {
                    miette::miette!("Cannot open store {}: {}", path.display(), e)
                })?;
                Ok(Box::new(store))
            }
        }
    }

    /// Permission of the configured user on the configured database
    pub fn permission(&self) -> Result<Permission> {
        let source = HttpPermissionSource::new(self.client()?);
        Ok(resolve_permission(
            &source,
            self.config.username(),
            self.config.database(),
        ))
    }

    /// Whether dataset changes are allowed.
    ///
    /// The local store has no users, so it always allows them.
    pub fn is_admin(&self) -> Result<bool> {
        if self.config.store() == StoreKind::Sqlite {
            return Ok(true);
        }
        let source = HttpPermissionSource::new(self.client()?);
        Ok(is_admin_user(
            &source,
            self.config.username(),
            self.config.database(),
            self.config.authentication_enabled(),
        ))
    }

    /// Fail unless the user may change datasets
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin()? {
            return Ok(());
        }
        Err(miette::miette!(
            help = "Dataset changes need \"rw\" access, or a server with authentication disabled",
            "User '{}' is not an administrator of database '{}'",
            self.config.username(),
            self.config.database()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sqlite_context(tmp: &TempDir) -> Context {
        let config = Config {
            store: Some(StoreKind::Sqlite),
            store_path: Some(tmp.path().join("data.db")),
            ..Config::default()
        };
        Context::with_config(config, true)
    }

    #[test]
    fn test_sqlite_store_is_always_admin() {
        let tmp = TempDir::new().unwrap();
        let ctx = sqlite_context(&tmp);
        assert!(ctx.is_admin().unwrap());
        ctx.require_admin().unwrap();
    }

    #[test]
    fn test_open_sqlite_store_creates_file() {
        let tmp = TempDir::new().unwrap();
        let ctx = sqlite_context(&tmp);
        let store = ctx.open_store().unwrap();
        assert!(store.collections().unwrap().is_empty());
        assert!(tmp.path().join("data.db").exists());
    }

    #[test]
    fn test_invalid_endpoint_is_reported() {
        let config = Config {
            endpoint: Some("not a url".into()),
            ..Config::default()
        };
        let ctx = Context::with_config(config, true);
        assert!(ctx.client().is_err());
        assert!(ctx.open_store().is_err());
    }
}
