use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf};

use crate::provider::SourceId;

/// Configuration for a single upstream source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub access_key: String,

    /// Optional base URL; the source's built-in default applies when unset.
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Process-wide defaults, read once at startup and treated as read-only from
/// then on. Per-request overrides are resolved inside the fetch call and are
/// never written back here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Optional default source id, e.g. "weatherstack" or "mock".
    pub default_source: Option<String>,

    /// Example TOML:
    /// [sources.weatherstack]
    /// access_key = "..."
    pub sources: HashMap<String, SourceConfig>,
}

impl Config {
    /// Return the default source as a strongly-typed SourceId.
    pub fn default_source_id(&self) -> Result<SourceId> {
        let s = self.default_source.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No default source configured.\n\
                 Hint: run `weather-proxy configure <source>` (e.g. `weather-proxy configure weatherstack`) first."
            )
        })?;

        SourceId::try_from(s.as_str())
    }

    pub fn has_source(&self, id: SourceId) -> bool {
        self.sources.contains_key(id.as_str())
    }

    pub fn source_config(&self, id: SourceId) -> Option<&SourceConfig> {
        self.sources.get(id.as_str())
    }

    /// Store default source as string.
    pub fn set_default_source(&mut self, id: SourceId) {
        self.default_source = Some(id.as_str().to_string());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default path for the audit log file.
    pub fn audit_log_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("request_log.jsonl"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-proxy", "weather-proxy")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Convenience helper: set/replace a source's credentials and optionally
    /// set the default source.
    pub fn upsert_source(&mut self, id: SourceId, access_key: String, base_url: Option<String>) {
        self.sources.insert(id.as_str().to_string(), SourceConfig { access_key, base_url });

        if self.default_source.is_none() {
            self.default_source = Some(id.to_string());
        }
    }

    /// Returns the access key for a source, if present.
    pub fn source_access_key(&self, id: SourceId) -> Option<&str> {
        self.sources.get(id.as_str()).map(|cfg| cfg.access_key.as_str())
    }

    pub fn is_source_configured(&self, id: SourceId) -> bool {
        self.source_access_key(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SourceId;

    #[test]
    fn default_source_id_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_source_id().unwrap_err();

        assert!(err.to_string().contains("No default source configured"));
    }

    #[test]
    fn set_access_key_and_default_for_source() {
        let mut cfg = Config::default();

        cfg.upsert_source(SourceId::Weatherstack, "STACK_KEY".into(), None);

        let default = cfg.default_source_id().expect("default source must exist");
        assert_eq!(default, SourceId::Weatherstack);

        let key = cfg.source_access_key(SourceId::Weatherstack);
        assert_eq!(key, Some("STACK_KEY"));
        assert!(cfg.is_source_configured(SourceId::Weatherstack));
    }

    #[test]
    fn upsert_does_not_override_existing_default() {
        let mut cfg = Config::default();

        cfg.upsert_source(SourceId::Weatherstack, "STACK_KEY".into(), None);
        cfg.upsert_source(SourceId::Mock, "MOCK_KEY".into(), None);

        let default = cfg.default_source_id().expect("default source must exist");

        assert_eq!(default, SourceId::Weatherstack);
        assert!(cfg.is_source_configured(SourceId::Weatherstack));
        assert!(cfg.is_source_configured(SourceId::Mock));
    }

    #[test]
    fn set_default_source_overrides_default() {
        let mut cfg = Config::default();

        cfg.upsert_source(SourceId::Weatherstack, "STACK_KEY".into(), None);

        let default = cfg.default_source_id().expect("default source must exist");
        assert_eq!(default, SourceId::Weatherstack);

        cfg.set_default_source(SourceId::Mock);

        let default = cfg.default_source_id().expect("default source must exist");
        assert_eq!(default, SourceId::Mock);
    }

    #[test]
    fn upsert_keeps_an_explicit_base_url() {
        let mut cfg = Config::default();

        cfg.upsert_source(
            SourceId::Weatherstack,
            "STACK_KEY".into(),
            Some("http://proxy.example.com/current".into()),
        );

        let source = cfg.source_config(SourceId::Weatherstack).expect("source exists");
        assert_eq!(source.base_url.as_deref(), Some("http://proxy.example.com/current"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.upsert_source(SourceId::Weatherstack, "STACK_KEY".into(), None);

        let toml = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: Config = toml::from_str(&toml).expect("parses back");

        assert_eq!(parsed.default_source.as_deref(), Some("weatherstack"));
        assert_eq!(parsed.source_access_key(SourceId::Weatherstack), Some("STACK_KEY"));
    }
}
