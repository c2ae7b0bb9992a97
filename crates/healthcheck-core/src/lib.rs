pub mod inputs;
pub mod report;
pub mod schema;

pub use inputs::{
    FieldKind, HealthCheckInputs, InputError, InputField, InputValue, LoginFrequency, Section,
};
pub use report::{
    report_schema, Evaluation, HealthCheckReport, KpiAnalysis, MaturityLevel, Recommendation,
    ReportError, StrategyStep, STRATEGY_PHASES,
};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// --- Storage ---

/// Resolve the data directory (~/.healthcheck/).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".healthcheck")
}

pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Read a JSON inputs file as posted by the form.
pub fn read_inputs(path: &Path) -> Result<HealthCheckInputs, StorageError> {
    let raw = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `data` through a temp file + rename so readers never see a torn file.
pub fn write_atomic(path: &Path, data: &str) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, data).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

// --- AI Settings ---

/// Provider configuration handed explicitly to the report requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    /// Overrides the provider's endpoint (proxies, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Provider and model are set, and a key is present unless the provider
    /// runs locally.
    pub fn is_configured(&self) -> bool {
        !self.provider.is_empty()
            && !self.model.is_empty()
            && (self.provider == "ollama" || !self.api_key.is_empty())
    }
}

/// Read settings from `path`. A missing or unreadable file yields defaults.
pub fn read_settings_from(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn read_settings() -> Settings {
    read_settings_from(&settings_path())
}

pub fn write_settings_to(path: &Path, settings: &Settings) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(settings).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &json)
}

pub fn write_settings(settings: &Settings) -> Result<(), StorageError> {
    write_settings_to(&settings_path(), settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            provider: "openai".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: Some("http://localhost:9999".to_string()),
            timeout_secs: 30,
        };
        write_settings_to(&path, &settings).unwrap();
        assert_eq!(read_settings_from(&path), settings);
        assert!(!dir.path().join("nested").join(".settings.json.tmp").exists());
    }

    #[test]
    fn missing_or_corrupt_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(read_settings_from(&path), Settings::default());

        fs::write(&path, "{not json").unwrap();
        assert_eq!(read_settings_from(&path), Settings::default());
    }

    #[test]
    fn partial_settings_keep_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"apiKey": "abc"}"#).unwrap();
        let settings = read_settings_from(&path);
        assert_eq!(settings.api_key, "abc");
        assert_eq!(settings.provider, DEFAULT_PROVIDER);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn configured_requires_key_except_for_ollama() {
        let mut settings = Settings::default();
        assert!(!settings.is_configured());
        settings.api_key = "k".to_string();
        assert!(settings.is_configured());

        let local = Settings {
            provider: "ollama".to_string(),
            model: "llama3".to_string(),
            ..Settings::default()
        };
        assert!(local.is_configured());
    }

    #[test]
    fn reads_inputs_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inputs.json");
        fs::write(&path, r#"{"backlog": 300, "preventivePercentage": 10}"#).unwrap();
        let inputs = read_inputs(&path).unwrap();
        assert_eq!(inputs.backlog, Some(300.0));
        assert_eq!(inputs.preventive_percentage, Some(10.0));

        let missing = read_inputs(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, StorageError::Io { .. }));
    }
}
