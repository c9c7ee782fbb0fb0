use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CogCommitConfig {
    pub general: GeneralConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
    pub studio: StudioConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImportConfig {
    /// Root of the Claude Code transcript tree (one directory per project).
    pub claude_projects_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StudioConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub supabase_url: Option<String>,
    pub anon_key: Option<String>,
    pub access_token: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_cogcommit_dir()
            .join("data.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            claude_projects_dir: "~/.claude/projects".into(),
        }
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 4747,
        }
    }
}

/// Returns `~/.cogcommit/`, falling back to the working directory when no
/// home directory can be resolved.
pub fn default_cogcommit_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cogcommit")
}

/// Returns the default config file path: `~/.cogcommit/config.toml`
pub fn default_config_path() -> PathBuf {
    default_cogcommit_dir().join("config.toml")
}

impl CogCommitConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CogCommitConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COGCOMMIT_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("COGCOMMIT_LOG_LEVEL") {
            self.general.log_level = val;
        }
        if let Ok(val) = std::env::var("COGCOMMIT_SUPABASE_URL") {
            self.sync.supabase_url = Some(val);
        }
        if let Ok(val) = std::env::var("COGCOMMIT_SUPABASE_ANON_KEY") {
            self.sync.anon_key = Some(val);
        }
        if let Ok(val) = std::env::var("COGCOMMIT_ACCESS_TOKEN") {
            self.sync.access_token = Some(val);
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_claude_projects_dir(&self) -> PathBuf {
        expand_tilde(&self.import.claude_projects_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
