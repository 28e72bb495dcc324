//! Errors with suggestions for CLI users
//!
//! Schema errors from the library are precise but terse. The CLI wraps them
//! with the document path and a hint about which part of the document to fix.

use monotable_schema::{ErrorKind, SchemaError};
use std::fmt;
use std::path::Path;

/// An error with context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    // === Common error constructors ===

    pub fn path_not_found(path: &Path) -> Self {
        Self::new(format!("Path not found: {}", path.display()))
            .with_suggestion(format!("TRY: Check that the file exists: ls -la {}", path.display()))
    }

    pub fn unsupported_format(path: &Path) -> Self {
        Self::new(format!("Unsupported table document: {}", path.display()))
            .with_context("Table documents are read by extension")
            .with_suggestion("TRY: Use a .json or .toml file")
    }

    /// Wrap a schema error raised while building the table in `path`.
    pub fn from_schema(err: &SchemaError, path: &Path) -> Self {
        let base = Self::new(err.to_string())
            .with_context(format!("While building the table in {}", path.display()));
        let hint = match err.kind() {
            ErrorKind::MissingRequiredField => {
                "TRY: Set both \"name\" and \"partitionKey\" at the top level, and a name on every entity"
            }
            ErrorKind::InvalidAttributeType => {
                "TRY: Use one of string, number, binary, boolean, list, map, set; key attributes must be string, number, or binary"
            }
            ErrorKind::InvalidIndexDefinition => {
                "TRY: Give the index a partitionKey, a sortKey, or both"
            }
            ErrorKind::InvalidEntityKeySchema => {
                "TRY: Mark exactly one entity attribute partitionKey (and at most one sortKey if the table has a sortKey)"
            }
            ErrorKind::ConflictingAttributeMapping => {
                "TRY: Map the attribute to a different physical name or align its type across entities"
            }
            ErrorKind::DuplicateEntityName => "TRY: Give each entity a unique name",
            ErrorKind::IncompatibleClient => {
                "TRY: Declare every required operation in client.capabilities"
            }
        };
        base.with_suggestion(hint)
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
