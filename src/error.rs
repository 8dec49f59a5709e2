use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Required input for {entity} not found at {}", path.display())]
    MissingInput { entity: String, path: PathBuf },

    #[error("Column '{column}' missing from {entity} table")]
    MissingColumn { entity: String, column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid expectation pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
