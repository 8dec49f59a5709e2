use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Environment variable naming a config file when `--config` is not given
pub const CONFIG_ENV_VAR: &str = "COMMERCE_QUALITY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Which occurrence survives when several rows share a natural key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    KeepFirst,
    #[default]
    KeepLast,
}

/// PDF export backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfExport {
    #[default]
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw extracts, one CSV per entity
    pub raw_dir: PathBuf,
    /// Output of the ingestion stage
    pub processed_dir: PathBuf,
    /// Output of the correction stage
    pub corrected_dir: PathBuf,
    pub enriched_dir: PathBuf,
    /// Validation artifacts and the executive report
    pub report_dir: PathBuf,
    pub log_dir: PathBuf,
    pub dedup_policy: DedupPolicy,
    /// Date used for age calculations; today when absent
    pub reference_date: Option<NaiveDate>,
    /// JSON file with expectation suites replacing the built-in ones
    pub suites_file: Option<PathBuf>,
    pub pdf_export: PdfExport,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("datasets"),
            processed_dir: PathBuf::from("data"),
            corrected_dir: PathBuf::from("data_corrigida"),
            enriched_dir: PathBuf::from("data/enriquecido"),
            report_dir: PathBuf::from("data/quality_docs"),
            log_dir: PathBuf::from("logs"),
            dedup_policy: DedupPolicy::default(),
            reference_date: None,
            suites_file: None,
            pdf_export: PdfExport::default(),
        }
    }
}

impl PipelineConfig {
    /// Resolve the configuration: an explicit path must exist, then the
    /// environment variable, then `config.toml` if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Self::from_file(Path::new(path.trim()));
            }
        }
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Configuration rooted at a single directory, used by tests and demos
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            raw_dir: root.join("datasets"),
            processed_dir: root.join("data"),
            corrected_dir: root.join("data_corrigida"),
            enriched_dir: root.join("data").join("enriquecido"),
            report_dir: root.join("data").join("quality_docs"),
            log_dir: root.join("logs"),
            ..Self::default()
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
