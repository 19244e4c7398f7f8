use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_grace_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "https://economia.awesomeapi.com.br/json/last".to_string(),
        }
    }
}

/// Time allowed to each stage of a request, in milliseconds.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BudgetConfig {
    pub request_ms: u64,
    pub store_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        BudgetConfig {
            request_ms: 200,
            store_ms: 10,
        }
    }
}

impl BudgetConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn store(&self) -> Duration {
        Duration::from_millis(self.store_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub database_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_name: "cotacao".to_string(),
        }
    }
}

/// Whether a failed or late store write fails the request.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Log the failure and still answer with the bid.
    #[default]
    BestEffort,
    /// Answer with the store error instead of the bid.
    Required,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub budgets: BudgetConfig,
    #[serde(default)]
    pub persistence: PersistencePolicy,
    #[serde(default)]
    pub store: StoreConfig,
    pub data_path: Option<String>,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("cotacao.txt")
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            budgets: BudgetConfig::default(),
            persistence: PersistencePolicy::default(),
            store: StoreConfig::default(),
            data_path: None,
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("br", "cotacao", "cotacao").context("Could not determine project directories")
}

impl AppConfig {
    /// Loads the default config file if there is one, falling back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Directory holding the quote keyspace.
    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self
            .default_data_path()?
            .join(format!("{}.db", self.store.database_name)))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies `SERVER_PORT`, `DATABASE_NAME` and `API_BASE_URL` on top of the file.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(port) = var("SERVER_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid SERVER_PORT: {port}"))?;
        }
        if let Some(name) = var("DATABASE_NAME") {
            self.store.database_name = name;
        }
        if let Some(url) = var("API_BASE_URL") {
            self.upstream.base_url = url;
        }
        Ok(())
    }
}
