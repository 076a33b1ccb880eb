//! adjoin configuration.
//!
//! Loaded from `config.toml` in the config directory. Every field has a
//! default, so a missing file or a partial one is fine.
//!
//! # Environment Variables
//!
//! - `ADJOIN_CONFIG_DIR` - Override config directory
//!
//! ```toml
//! [paths]
//! vastool = "/opt/quest/bin/vastool"
//! accounts = "files"
//!
//! [preflight]
//! timeout = 10
//! timesync = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vaskit::{AccountSource, Paths};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "ADJOIN_CONFIG_DIR";

/// Get the adjoin config directory path
///
/// Priority:
/// 1. `ADJOIN_CONFIG_DIR` env var
/// 2. `~/.config/adjoin`
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("adjoin"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// How local accounts are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountsMode {
    /// Directory services on macOS, files elsewhere
    #[default]
    Native,
    /// Always read the passwd and group files
    Files,
    /// Always query `dscl`
    Dscl,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub vastool: String,
    pub preflight: String,
    pub asdcom: String,
    pub passwd: String,
    pub group: String,
    pub accounts: AccountsMode,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            vastool: vaskit::paths::VASTOOL_PATH.to_string(),
            preflight: vaskit::paths::PREFLIGHT_PATH.to_string(),
            asdcom: vaskit::paths::ASDCOM_PATH.to_string(),
            passwd: vaskit::local::PASSWD_PATH.to_string(),
            group: vaskit::local::GROUP_PATH.to_string(),
            accounts: AccountsMode::Native,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreflightConfig {
    /// Per-check timeout in seconds
    pub timeout: u32,
    /// Check time synchronization
    pub timesync: bool,
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            timeout: vaskit::preflight::DEFAULT_TIMEOUT,
            timesync: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub preflight: PreflightConfig,
}

impl Config {
    /// Load from the config directory, or defaults if there is no file.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join("config.toml"))
    }

    /// Load from an explicit file, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        toml::from_str(&content).context("Invalid TOML format in adjoin config")
    }

    /// Binary locations, expanded.
    pub fn binaries(&self) -> Paths {
        Paths {
            vastool: expand(&self.paths.vastool),
            preflight: expand(&self.paths.preflight),
            asdcom: expand(&self.paths.asdcom),
        }
    }

    /// Where local accounts come from.
    pub fn account_source(&self) -> AccountSource {
        let files = || AccountSource::files(expand(&self.paths.passwd), expand(&self.paths.group));
        match self.paths.accounts {
            AccountsMode::Files => files(),
            AccountsMode::Dscl => AccountSource::DirectoryService,
            AccountsMode::Native => match AccountSource::native() {
                AccountSource::DirectoryService => AccountSource::DirectoryService,
                AccountSource::Files { .. } => files(),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
