//! Application configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/salesbook/config/salesbook.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override file take their built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{BranchCode, BranchFilter};
use crate::trend::TrendThresholds;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/salesbook.toml");

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Application identifier, used to namespace stored data
    pub app_id: String,
    /// Known branch codes, in display order
    pub branches: Vec<BranchCode>,
    pub thresholds: TrendThresholds,
}

impl Default for AppConfig {
    fn default() -> Self {
        // The embedded file is validated by tests
        parse_config(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            app_id: "salesbook".to_string(),
            branches: vec![],
            thresholds: TrendThresholds::default(),
        })
    }
}

impl AppConfig {
    /// Load from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit file
    ///
    /// A path that does not exist falls back to the embedded defaults.
    pub fn with_config_path(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Whether a branch code is configured
    pub fn is_known_branch(&self, branch: &BranchCode) -> bool {
        self.branches.iter().any(|b| b == branch)
    }

    /// Resolve a raw branch code, rejecting unknown codes
    pub fn resolve_branch(&self, code: &str) -> Result<BranchCode> {
        let branch = BranchCode::new(code);
        if branch.as_str().is_empty() || !self.is_known_branch(&branch) {
            return Err(Error::UnknownBranch(code.trim().to_string()));
        }
        Ok(branch)
    }

    /// Resolve a query filter: `all` or a configured branch code
    pub fn resolve_filter(&self, value: &str) -> Result<BranchFilter> {
        let filter: BranchFilter = value.parse().map_err(Error::InvalidData)?;
        if let BranchFilter::Branch(ref branch) = filter {
            if !self.is_known_branch(branch) {
                return Err(Error::UnknownBranch(branch.to_string()));
            }
        }
        Ok(filter)
    }
}

/// Default override location in the platform data dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("salesbook").join("config").join("salesbook.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AppConfig> {
    let path = match override_path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let content = match path {
        Some(path) if path.exists() => {
            debug!(path = %path.display(), "Loading config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    app_id: Option<String>,
    branches: Option<Vec<String>>,
    thresholds: Option<TrendThresholds>,
}

fn parse_config(content: &str) -> Result<AppConfig> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))?;

    let app_id = raw.app_id.unwrap_or_else(|| "salesbook".to_string());

    let codes = match raw.branches {
        Some(codes) => codes,
        None => embedded_branch_codes()?,
    };
    let branches = build_branches(codes)?;

    Ok(AppConfig {
        app_id,
        branches,
        thresholds: raw.thresholds.unwrap_or_default(),
    })
}

/// Branch list from the embedded defaults
fn embedded_branch_codes() -> Result<Vec<String>> {
    let raw: RawConfig = toml::from_str(DEFAULT_CONFIG)
        .map_err(|e| Error::Config(format!("Invalid embedded config: {}", e)))?;
    Ok(raw.branches.unwrap_or_default())
}

fn build_branches(codes: Vec<String>) -> Result<Vec<BranchCode>> {
    let mut branches: Vec<BranchCode> = Vec::new();
    for code in codes {
        let branch = BranchCode::new(&code);
        if branch.as_str().is_empty() {
            return Err(Error::Config("Branch codes cannot be empty".to_string()));
        }
        if !branches.contains(&branch) {
            branches.push(branch);
        }
    }
    if branches.is_empty() {
        return Err(Error::Config("At least one branch must be configured".to_string()));
    }
    Ok(branches)
}
