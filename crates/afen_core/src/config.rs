use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

// ---------------------------------------------------------------------------
// MarketConfig
// ---------------------------------------------------------------------------

/// Client configuration stored at `~/.afen/config.json`.
///
/// Every field has a default, so a partial file on disk is still accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    // Off-chain metadata service
    pub api_base_url: String,

    // Chain
    pub rpc_url: String,
    pub mobile_rpc_url: Option<String>,
    pub nft_contract_address: String,
    pub chain_id: u64,

    // Network
    pub request_timeout_secs: u64,

    // UI
    pub theme: String,

    // General
    pub log_level: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".into(),
            rpc_url: "http://localhost:8545".into(),
            mobile_rpc_url: None,
            nft_contract_address: "0x0000000000000000000000000000000000000000".into(),
            chain_id: 56,
            request_timeout_secs: 30,
            theme: "dark".into(),
            log_level: "info".into(),
        }
    }
}

impl MarketConfig {
    /// Returns the base config directory: `~/.afen/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".afen"))
    }

    /// Returns the config file path: `~/.afen/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.afen/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        for dir in [Self::base_dir()?, Self::logs_dir()?] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from `~/.afen/config.json`, creating the default if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path. A missing file is created with
    /// the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self =
                serde_json::from_str(&content).with_context(|| "Failed to parse config.json")?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Check endpoint URLs and the contract address.
    pub fn validate(&self) -> Result<()> {
        if !validate_url(&self.api_base_url) {
            anyhow::bail!("invalid metadata API URL: {}", self.api_base_url);
        }
        if !validate_url(&self.rpc_url) {
            anyhow::bail!("invalid RPC URL: {}", self.rpc_url);
        }
        if let Some(mobile) = &self.mobile_rpc_url {
            if !validate_url(mobile) {
                anyhow::bail!("invalid mobile RPC URL: {mobile}");
            }
        }
        if !validate_address(&self.nft_contract_address) {
            anyhow::bail!("invalid NFT contract address: {}", self.nft_contract_address);
        }
        Ok(())
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

/// Validate a `0x`-prefixed, 20-byte hex account or contract address.
pub fn validate_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// ConfigManager
// ---------------------------------------------------------------------------

/// Thread-safe config holder bound to one file on disk.
pub struct ConfigManager {
    config: Arc<RwLock<MarketConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// Open the config at `~/.afen/config.json`.
    pub fn new() -> Result<Self> {
        let config = MarketConfig::load()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            path: MarketConfig::config_path()?,
        })
    }

    /// Open (or create) the config at an explicit path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config = MarketConfig::load_from_path(&path)?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            path,
        })
    }

    /// Get a clone of the current config.
    pub fn get(&self) -> MarketConfig {
        self.config.read().clone()
    }

    /// Mutate the config and persist it.
    pub fn update(&self, f: impl FnOnce(&mut MarketConfig)) -> Result<()> {
        let mut config = self.config.write();
        f(&mut config);
        config.save_to_path(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
