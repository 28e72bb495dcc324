//! Table document loading.
//!
//! The format is chosen by extension: `.toml` is parsed as TOML, `.json` as
//! JSON. Parse failures carry the file path; schema failures are converted
//! into [`HelpfulError`]s by [`load_table`].

use super::error::HelpfulError;
use anyhow::{Context, Result};
use monotable_schema::{Table, TableConfig};
use std::fs;
use std::path::Path;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, HelpfulError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("toml") => Ok(DocumentFormat::Toml),
            _ => Err(HelpfulError::unsupported_format(path)),
        }
    }
}

/// Parse document text in the given format.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<TableConfig> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(text).context("Failed to parse table document as JSON")
        }
        DocumentFormat::Toml => toml::from_str(text).context("Failed to parse table document as TOML"),
    }
}

/// Read and parse a table document.
pub fn load_document(path: &Path) -> Result<TableConfig> {
    if !path.exists() {
        return Err(HelpfulError::path_not_found(path).into());
    }
    let format = DocumentFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read table document: {}", path.display()))?;
    parse_document(&text, format).with_context(|| format!("Invalid document: {}", path.display()))
}

/// Read a table document and build the table it describes.
pub fn load_table(path: &Path) -> Result<Table> {
    let config = load_document(path)?;
    let table = Table::from_config(config).map_err(|err| HelpfulError::from_schema(&err, path))?;
    tracing::debug!("Loaded table '{}' from {}", table.name(), path.display());
    Ok(table)
}
