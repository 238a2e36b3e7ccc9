//! Server configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a YAML file named by `COURIER_CONFIG`
//! 3. the `LISTEN`, `FILES_DIR` and `READ_TIMEOUT_MS` environment variables

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

pub const CONFIG_PATH_VAR: &str = "COURIER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the listening socket binds to.
    pub listen_addr: String,
    /// Pending-connection queue length handed to `listen(2)`.
    pub backlog: u32,
    /// Directory `/file/{name}` is served from.
    pub files_dir: PathBuf,
    /// Upper bound on the request bytes read from a connection.
    pub max_request_size: usize,
    /// Optional read timeout per connection. Unset means a silent peer
    /// holds its task until it disconnects.
    pub read_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:4221".to_string(),
            backlog: 5,
            files_dir: PathBuf::from("."),
            max_request_size: 4096,
            read_timeout_ms: None,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration reading variables through `lookup`.
    pub fn load_with<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(addr) = lookup("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(dir) = lookup("FILES_DIR") {
            cfg.files_dir = PathBuf::from(dir);
        }
        if let Some(ms) = lookup("READ_TIMEOUT_MS") {
            let ms = ms
                .parse::<u64>()
                .with_context(|| format!("READ_TIMEOUT_MS is not a number: {ms:?}"))?;
            cfg.read_timeout_ms = Some(ms);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.socket_addr()?;
        if self.backlog == 0 {
            bail!("backlog must be at least 1");
        }
        if self.max_request_size == 0 {
            bail!("max_request_size must be at least 1");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen address {:?}", self.listen_addr))
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}
