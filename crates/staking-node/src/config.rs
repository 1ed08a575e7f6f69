use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "STAKING_INDEXER_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexerConfig {
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ethereum: EthereumConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_node_label")]
    pub label: String,
}

fn default_node_label() -> String {
    "staking-node".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            label: default_node_label(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "staking-index".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EthereumConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Skips the `stakingToken()` read when set.
    #[serde(default)]
    pub token_address: Option<String>,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            timeout_ms: default_timeout_ms(),
            token_address: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn resolve_env_refs(mut v: toml::Value) -> Result<toml::Value, String> {
    fn walk(v: &mut toml::Value) -> Result<(), String> {
        match v {
            toml::Value::String(s) => {
                if let Some(var) = s.strip_prefix("env:") {
                    let var = var.trim();
                    if var.is_empty() {
                        return Err("invalid env: reference (empty var name)".to_string());
                    }
                    *s = std::env::var(var)
                        .map_err(|_| format!("missing required environment variable: {var}"))?;
                }
            }
            toml::Value::Array(items) => items.iter_mut().try_for_each(walk)?,
            toml::Value::Table(map) => map.iter_mut().try_for_each(|(_, x)| walk(x))?,
            _ => {}
        }
        Ok(())
    }
    walk(&mut v)?;
    Ok(v)
}

pub fn parse_config(raw: &str) -> Result<IndexerConfig, String> {
    let parsed: toml::Value = toml::from_str(raw).map_err(|e| format!("parse: {e}"))?;
    let resolved = resolve_env_refs(parsed)?;
    let cfg: IndexerConfig = resolved.try_into().map_err(|e| format!("decode: {e}"))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path) -> Result<IndexerConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    parse_config(&raw).map_err(|e| format!("config {}: {e}", path.display()))
}

impl IndexerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.path.trim().is_empty() {
            return Err("storage.path is empty".to_string());
        }
        if self.ethereum.token_address.is_none() && self.ethereum.rpc_url.trim().is_empty() {
            return Err("ethereum.rpc_url is empty and no ethereum.token_address is set".to_string());
        }
        if self.ethereum.timeout_ms == 0 {
            return Err("ethereum.timeout_ms must be positive".to_string());
        }
        match self.logging.format.to_ascii_lowercase().as_str() {
            "json" | "text" => Ok(()),
            other => Err(format!("logging.format must be json or text, got {other}")),
        }
    }
}
