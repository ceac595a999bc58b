use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;

pub const DEFAULT_SNIFF_LEN: usize = 2048;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub accept_invalid_certs: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/v1".to_string(),
            model: "deepseek-v3".to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: None,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IngestionConfig {
    pub sniff_len: usize,
    pub max_document_bytes: u64,
    pub max_member_bytes: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            sniff_len: DEFAULT_SNIFF_LEN,
            max_document_bytes: 200 * 1024 * 1024,
            max_member_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    pub summary_file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            summary_file_name: "medical_summary.txt".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub ingestion: IngestionConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Layers `<dir>/default`, `<dir>/<RUN_MODE>` and `MEDBRIEF__*` variables
    /// over the built-in defaults. Missing files are not an error.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let default_path = dir.join("default");
        let mode_path = dir.join(&run_mode);

        let builder = Config::builder()
            .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
            .add_source(File::with_name(&mode_path.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("MEDBRIEF")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ingestion.sniff_len == 0 {
            return Err(ConfigError::Message(
                "ingestion.sniff_len must be greater than zero".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Message("llm.model must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.ingestion.sniff_len, 2048);
        assert_eq!(config.export.summary_file_name, "medical_summary.txt");
        assert!(!config.llm.accept_invalid_certs);
    }

    #[test]
    fn test_default_file_overrides_builtin_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[llm]\nbase_url = \"https://llm.example.test/v1\"\nmodel = \"clinical-large\"\ntimeout_secs = 30\n\n[ingestion]\nmax_member_bytes = 1024\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.llm.base_url, "https://llm.example.test/v1");
        assert_eq!(config.llm.model, "clinical-large");
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.ingestion.max_member_bytes, 1024);
        // Untouched keys keep their defaults.
        assert_eq!(config.ingestion.sniff_len, 2048);
    }

    #[test]
    fn test_zero_sniff_len_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("default.toml"), "[ingestion]\nsniff_len = 0\n").unwrap();

        let err = AppConfig::load_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("sniff_len"));
    }
}
