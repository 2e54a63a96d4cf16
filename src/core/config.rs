//! Configuration management with layered hierarchy

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::client::Auth;
use crate::core::Project;

/// Default server endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8529";

/// Default database
pub const DEFAULT_DATABASE: &str = "_system";

/// Default user
pub const DEFAULT_USERNAME: &str = "root";

/// Where dataset procedures write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// A live ArangoDB server
    #[default]
    Arango,
    /// A local SQLite file
    Sqlite,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKind::Arango => write!(f, "arango"),
            StoreKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// arex configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Server endpoint, e.g. http://localhost:8529
    pub endpoint: Option<String>,

    /// Database the datasets are written to
    pub database: Option<String>,

    /// User name for authentication and permission lookups
    pub username: Option<String>,

    /// Password for basic authentication
    pub password: Option<String>,

    /// JWT used instead of the password when set
    pub token: Option<String>,

    /// Whether the server enforces authentication
    pub authentication: Option<bool>,

    /// Backend for dataset operations
    pub store: Option<StoreKind>,

    /// File used by the sqlite backend
    pub store_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project = Project::discover().ok();
        let mut config = Self::load_files(Self::global_config_path().as_deref(), project.as_ref());
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Merge the global file and the project file (project wins)
    pub fn load_files(global: Option<&Path>, project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl and accessors)

        // 2. Global user config (~/.config/arex/config.yaml)
        if let Some(global) = global.and_then(Self::read_file) {
            config.merge(global);
        }

        // 3. Project config (.arex/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
            // A relative store path is relative to the project root
            if let Some(path) = &config.store_path {
                if path.is_relative() {
                    config.store_path = Some(project.root().join(path));
                }
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// 4. Environment variables (AREX_*)
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = var("AREX_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(database) = var("AREX_DATABASE") {
            self.database = Some(database);
        }
        if let Some(username) = var("AREX_USERNAME") {
            self.username = Some(username);
        }
        if let Some(password) = var("AREX_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(token) = var("AREX_TOKEN") {
            self.token = Some(token);
        }
        if let Some(flag) = var("AREX_AUTHENTICATION") {
            if let Some(enabled) = parse_flag(&flag) {
                self.authentication = Some(enabled);
            }
        }
        if let Some(store) = var("AREX_STORE") {
            if let Ok(kind) = StoreKind::from_str(&store, true) {
                self.store = Some(kind);
            }
        }
        if let Some(path) = var("AREX_STORE_PATH") {
            self.store_path = Some(PathBuf::from(path));
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "arex")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.authentication.is_some() {
            self.authentication = other.authentication;
        }
        if other.store.is_some() {
            self.store = other.store;
        }
        if other.store_path.is_some() {
            self.store_path = other.store_path;
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn database(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    pub fn authentication_enabled(&self) -> bool {
        self.authentication.unwrap_or(true)
    }

    pub fn store(&self) -> StoreKind {
        self.store.unwrap_or_default()
    }

    /// Store file for the sqlite backend: configured path, else inside the
    /// project directory, else `arex.db` in the working directory
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        match Project::discover() {
            Ok(project) => project.arex_dir().join("data.db"),
            Err(_) => PathBuf::from("arex.db"),
        }
    }

    /// Credentials to send with each request
    pub fn auth(&self) -> Auth {
        if !self.authentication_enabled() {
            return Auth::None;
        }
        if let Some(token) = &self.token {
            return Auth::Bearer(token.clone());
        }
        Auth::Basic {
            username: self.username().to_string(),
            password: self.password.clone(),
        }
    }

    /// Display value of a key; secrets are masked
    pub fn value(&self, key: &str) -> Option<String> {
        match key {
            "endpoint" => self.endpoint.clone(),
            "database" => self.database.clone(),
            "username" => self.username.clone(),
            "password" => self.password.as_ref().map(|_| "********".to_string()),
            "token" => self.token.as_ref().map(|_| "********".to_string()),
            "authentication" => self.authentication.map(|b| b.to_string()),
            "store" => self.store.map(|s| s.to_string()),
            "store_path" => self.store_path.as_ref().map(|p| p.display().to_string()),
            _ => None,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.database(), "_system");
        assert_eq!(config.username(), "root");
        assert!(config.authentication_enabled());
        assert_eq!(config.store(), StoreKind::Arango);
        assert_eq!(
            config.auth(),
            Auth::Basic {
                username: "root".into(),
                password: None
            }
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            endpoint: Some("http://a:8529".into()),
            database: Some("one".into()),
            ..Default::default()
        };
        base.merge(Config {
            database: Some("two".into()),
            ..Default::default()
        });
        assert_eq!(base.endpoint(), "http://a:8529");
        assert_eq!(base.database(), "two");
    }

    #[test]
    fn test_project_file_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.yaml");
        std::fs::write(&global, "endpoint: http://global:8529\ndatabase: g\n").unwrap();

        let root = tmp.path().join("proj");
        std::fs::create_dir_all(&root).unwrap();
        let project = Project::init(&root, false).unwrap();
        std::fs::write(
            project.config_path(),
            "database: shop\nstore: sqlite\nstore_path: data/example.db\n",
        )
        .unwrap();

        let config = Config::load_files(Some(&global), Some(&project));
        assert_eq!(config.endpoint(), "http://global:8529");
        assert_eq!(config.database(), "shop");
        assert_eq!(config.store(), StoreKind::Sqlite);
        assert_eq!(config.store_path(), project.root().join("data/example.db"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("AREX_DATABASE", "tutorial"),
            ("AREX_AUTHENTICATION", "false"),
            ("AREX_STORE", "SQLITE"),
            ("AREX_TOKEN", "jwt"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.database(), "tutorial");
        assert!(!config.authentication_enabled());
        assert_eq!(config.store(), StoreKind::Sqlite);
        // Authentication off wins over a configured token
        assert_eq!(config.auth(), Auth::None);

        config.authentication = Some(true);
        assert_eq!(config.auth(), Auth::Bearer("jwt".into()));
    }

    #[test]
    fn test_secrets_masked() {
        let config = Config {
            password: Some("hunter2".into()),
            ..Default::default()
        };
        assert_eq!(config.value("password").as_deref(), Some("********"));
        assert_eq!(config.value("endpoint"), None);
        assert_eq!(config.value("bogus"), None);
    }
}
