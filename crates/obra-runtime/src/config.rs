//! Application configuration
//!
//! Defaults, then the settings file in the data directory, then
//! environment variables.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use obra_assistant::{GeminiClient, LanguageModel, DEFAULT_MODEL};
use obra_core::ObraError;
use obra_state::DEFAULT_STORAGE_KEY;
use obra_sync::{PostgrestRemote, RemoteStore};

use crate::{RuntimeError, RuntimeResult};

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_DATA_DIR: &str = ".obra";

pub const DEFAULT_LOG_FILTER: &str = "obra=info";

/// Remote store credentials. Sync is enabled only when both are set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSettings {
    #[serde(default)]
    pub sb_url: String,
    #[serde(default)]
    pub sb_key: String,
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("sb_url", &self.sb_url)
            .field("sb_key", &if self.sb_key.is_empty() { "" } else { "***" })
            .finish()
    }
}

impl RemoteSettings {
    pub fn new(sb_url: impl Into<String>, sb_key: impl Into<String>) -> Self {
        RemoteSettings {
            sb_url: sb_url.into(),
            sb_key: sb_key.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.sb_url.trim().is_empty() && !self.sb_key.trim().is_empty()
    }

    /// Build the PostgREST client these settings describe
    pub fn connect(&self) -> RuntimeResult<PostgrestRemote> {
        Ok(PostgrestRemote::new(&self.sb_url, &self.sb_key)?)
    }

    /// Read the settings file; a missing file yields empty settings
    pub fn load(data_dir: &Path) -> RuntimeResult<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| RuntimeError::State(ObraError::Encoding(e))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RemoteSettings::default()),
            Err(e) => Err(ObraError::Io(e).into()),
        }
    }

    pub fn save(&self, data_dir: &Path) -> RuntimeResult<()> {
        fs::create_dir_all(data_dir).map_err(ObraError::Io)?;
        let bytes = serde_json::to_vec_pretty(self).map_err(ObraError::Encoding)?;
        fs::write(data_dir.join(SETTINGS_FILE), bytes).map_err(ObraError::Io)?;
        debug!(configured = self.is_configured(), "remote settings saved");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: DEFAULT_LOG_FILTER.to_string(),
            json: false,
        }
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directory holding the snapshot and settings files
    pub data_dir: PathBuf,
    /// Snapshot file stem
    pub storage_key: String,
    pub remote: RemoteSettings,
    /// Language-model API key
    pub api_key: Option<String>,
    pub model: String,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            remote: RemoteSettings::default(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            logging: LoggingConfig::default(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl AppConfig {
    pub fn from_env() -> RuntimeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RuntimeResult<Self> {
        let mut config = AppConfig::default();

        if let Some(dir) = non_empty(lookup("OBRA_DATA_DIR")) {
            config.data_dir = PathBuf::from(dir);
        }
        config.remote = RemoteSettings::load(&config.data_dir)?;

        if let Some(url) = non_empty(lookup("OBRA_SB_URL")) {
            config.remote.sb_url = url;
        }
        if let Some(key) = non_empty(lookup("OBRA_SB_KEY")) {
            config.remote.sb_key = key;
        }
        config.api_key = non_empty(lookup("OBRA_API_KEY")).or_else(|| non_empty(lookup("API_KEY")));
        if let Some(model) = non_empty(lookup("OBRA_MODEL")) {
            config.model = model;
        }
        if let Some(json) = lookup("OBRA_LOG_JSON") {
            config.logging.json = flag(&json);
        }

        Ok(config)
    }

    /// Remote store for the configured credentials, if any
    pub fn remote_store(&self) -> RuntimeResult<Option<Arc<dyn RemoteStore>>> {
        if !self.remote.is_configured() {
            return Ok(None);
        }
        Ok(Some(Arc::new(self.remote.connect()?)))
    }

    pub fn language_model(&self) -> RuntimeResult<Arc<dyn LanguageModel>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| RuntimeError::Config("set OBRA_API_KEY to use the assistant".to_string()))?;
        Ok(Arc::new(GeminiClient::new(key, Some(&self.model))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage_key, "obraapp_v1_data");
        assert_eq!(config.model, "gemini-3-flash-preview");
        assert!(!config.remote.is_configured());
        assert!(config.remote_store().unwrap().is_none());
    }

    #[test]
    fn test_env_overrides_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        RemoteSettings::new("https://file.supabase.co", "file-key")
            .save(dir.path())
            .unwrap();

        let data_dir = dir.path().to_string_lossy().to_string();
        let config = AppConfig::from_lookup(lookup(&[
            ("OBRA_DATA_DIR", data_dir.as_str()),
            ("OBRA_SB_KEY", "env-key"),
            ("API_KEY", "fallback"),
            ("OBRA_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.remote.sb_url, "https://file.supabase.co");
        assert_eq!(config.remote.sb_key, "env-key");
        assert_eq!(config.api_key.as_deref(), Some("fallback"));
        assert!(config.logging.json);
        assert!(config.remote_store().unwrap().is_some());
    }

    #[test]
    fn test_settings_round_trip_and_redaction() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(RemoteSettings::load(dir.path()).unwrap(), RemoteSettings::default());

        let settings = RemoteSettings::new("https://x.supabase.co", "secret");
        settings.save(dir.path()).unwrap();
        assert_eq!(RemoteSettings::load(dir.path()).unwrap(), settings);
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn test_half_configured_remote_disabled() {
        let settings = RemoteSettings::new("https://x.supabase.co", " ");
        assert!(!settings.is_configured());
    }

    #[test]
    fn test_url_without_scheme_does_not_connect() {
        let settings = RemoteSettings::new("abc.supabase.co", "key");
        assert!(settings.is_configured());
        assert!(matches!(settings.connect(), Err(RuntimeError::Sync(_))));
        assert!(RemoteSettings::new("https://abc.supabase.co", "key")
            .connect()
            .is_ok());
    }

    #[test]
    fn test_language_model_requires_key() {
        assert!(matches!(
            AppConfig::default().language_model(),
            Err(RuntimeError::Config(_))
        ));
    }
}
