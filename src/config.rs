use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::client::RetryPolicy;
use crate::teams::{TeamRole, UserConfig};

pub const DEFAULT_STORE_FILE: &str = "teams.json";
pub const BOOTSTRAP_USER_ID: &str = "admin";
pub const BOOTSTRAP_TEAM_ID: &str = "default";

/// Configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server bind IP address
    #[serde(rename = "http-bind-ip", default = "default_bind_ip")]
    pub http_bind_ip: String,

    /// HTTP server bind port
    #[serde(rename = "http-bind-port", default = "default_bind_port")]
    pub http_bind_port: u16,

    /// Team config store file, relative paths resolve against the data dir
    #[serde(rename = "store-path", default = "default_store_path")]
    pub store_path: PathBuf,

    /// Retry and timeout settings for daemon calls
    #[serde(default)]
    pub client: ClientConfig,

    /// Dashboard users and their team roles
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// Attempts per read request, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_timeout_ms")]
    pub base_timeout_ms: u64,
    #[serde(default = "default_timeout_step_ms")]
    pub timeout_step_ms: u64,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_timeout_ms: default_base_timeout_ms(),
            timeout_step_ms: default_timeout_step_ms(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl ClientConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_timeout: Duration::from_millis(self.base_timeout_ms),
            timeout_step: Duration::from_millis(self.timeout_step_ms),
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_bind_ip: default_bind_ip(),
            http_bind_port: default_bind_port(),
            store_path: default_store_path(),
            client: ClientConfig::default(),
            users: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists (important for Docker volumes)
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file atomically
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;

        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, contents)?;

        // The config file is never left partially written
        match std::fs::rename(&temp_path, path) {
            Ok(_) => Ok(()),
            Err(e) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(e.into())
            }
        }
    }

    /// Get the complete HTTP server address
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.http_bind_ip, self.http_bind_port)
    }

    /// Store file location, resolved against `data_dir` when relative
    pub fn resolved_store_path(&self, data_dir: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            data_dir.join(&self.store_path)
        }
    }

    /// Random URL-safe bearer token
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Load or create the configuration file.
    ///
    /// A file that fails to parse is an error and stays untouched. When no
    /// user is configured an admin of the `default` team is created
    /// with a fresh token, and the returned flag is set.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        let mut user_generated = false;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // An unreadable file is never replaced, it holds the user registry
        let mut config = if path.exists() {
            Self::load_from_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            config
        };

        if config.users.is_empty() {
            config.users.push(UserConfig {
                id: BOOTSTRAP_USER_ID.to_string(),
                name: "Administrator".to_string(),
                token: Self::generate_token(),
                teams: BTreeMap::from([(BOOTSTRAP_TEAM_ID.to_string(), TeamRole::Admin)]),
            });
            user_generated = true;

            config.save_to_file(path)?;
        }

        Ok((config, user_generated))
    }
}

fn default_bind_ip() -> String {
    // 0.0.0.0 inside containers so the port can be published
    if std::env::var("DOCKER_CONTAINER").is_ok()
        || std::env::var("FMCD_DASHBOARD_ADDR").is_ok()
        || std::path::Path::new("/.dockerenv").exists()
        || std::env::var("KUBERNETES_SERVICE_HOST").is_ok()
    {
        "0.0.0.0".to_string()
    } else {
        "127.0.0.1".to_string()
    }
}

fn default_bind_port() -> u16 {
    7071
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_timeout_ms() -> u64 {
    10_000
}

fn default_timeout_step_ms() -> u64 {
    5_000
}

fn default_base_delay_ms() -> u64 {
    1_000
}
