use std::path::{Path, PathBuf};

use thiserror::Error;

use super::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Toml,
}

impl ModelFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ModelFormat::Toml,
            _ => ModelFormat::Json,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON model: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML model: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn parse_model(source: &str, format: ModelFormat) -> Result<Model, ModelError> {
    match format {
        ModelFormat::Json => Ok(serde_json::from_str(source)?),
        ModelFormat::Toml => Ok(toml::from_str(source)?),
    }
}

pub async fn load_model(path: &Path) -> Result<Model, ModelError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_model(&source, ModelFormat::from_path(path))
}
