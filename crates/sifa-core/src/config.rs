use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SifaError};
use crate::models::{FormProfile, Provider};

/// Root application configuration, loaded from `~/.config/sifa/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub suggest: SuggestConfig,
    pub form: FormConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Suggestion endpoint, queried as `<endpoint>?q=...`.
    pub endpoint: String,
    /// Provider hint appended as `&provider=...`. Profile default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub debounce_ms: u64,
    pub min_chars: usize,
    /// Maximum rows shown; 0 shows every result.
    pub limit: usize,
    pub timeout_ms: u64,
    pub blur_hide_ms: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub profile: FormProfile,
    /// Initial checked state of the "create new" toggle.
    pub start_in_create_mode: bool,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/productos/suggest/".to_string(),
            provider: None,
            debounce_ms: 220,
            min_chars: 2,
            limit: 0,
            timeout_ms: 2000,
            blur_hide_ms: 180,
            user_agent: format!("sifa/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            profile: FormProfile::DualMode,
            start_in_create_mode: false,
        }
    }
}

impl SuggestConfig {
    /// Provider hint to send for the given profile. The quick-add form always
    /// asks for the merged result set unless overridden.
    pub fn provider_for(&self, profile: FormProfile) -> Option<Provider> {
        self.provider.or(match profile {
            FormProfile::SingleField => Some(Provider::Hybrid),
            FormProfile::DualMode => None,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(SifaError::ConfigError(
                "suggest.endpoint must not be empty".to_string(),
            ));
        }
        if self.min_chars == 0 {
            return Err(SifaError::ConfigError(
                "suggest.min_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/sifa/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SIFA_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sifa")
            .join("config.toml")
    }

    /// Directory for the terminal UI log file.
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("sifa")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.suggest.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}
