//! Schema errors.
//!
//! Every failure is raised synchronously while a table is being built or an
//! entity is being registered. Nothing is retried and nothing is coerced.

use crate::client::Capability;
use thiserror::Error;

/// Errors raised while normalizing a table, registering an entity, or binding
/// a store client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("Invalid type for attribute '{attribute}': {reason}")]
    InvalidAttributeType { attribute: String, reason: String },

    #[error("Invalid index '{index}': {reason}")]
    InvalidIndexDefinition { index: String, reason: String },

    #[error("Invalid key schema for entity '{entity}': {reason}")]
    InvalidEntityKeySchema { entity: String, reason: String },

    #[error(
        "Entity '{entity}' maps attribute '{attribute}' as {requested}, but it is already {existing}"
    )]
    ConflictingAttributeMapping {
        attribute: String,
        entity: String,
        existing: String,
        requested: String,
    },

    #[error("Entity '{0}' is already registered on this table")]
    DuplicateEntityName(String),

    #[error("Client '{client}' is missing required capabilities: {}", format_capabilities(.missing))]
    IncompatibleClient {
        client: String,
        missing: Vec<Capability>,
    },
}

/// Error category, for callers that only branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredField,
    InvalidAttributeType,
    InvalidIndexDefinition,
    InvalidEntityKeySchema,
    ConflictingAttributeMapping,
    DuplicateEntityName,
    IncompatibleClient,
}

impl SchemaError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        SchemaError::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn invalid_attribute(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidAttributeType {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_index(index: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidIndexDefinition {
            index: index.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_key_schema(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidEntityKeySchema {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Returns the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            SchemaError::InvalidAttributeType { .. } => ErrorKind::InvalidAttributeType,
            SchemaError::InvalidIndexDefinition { .. } => ErrorKind::InvalidIndexDefinition,
            SchemaError::InvalidEntityKeySchema { .. } => ErrorKind::InvalidEntityKeySchema,
            SchemaError::ConflictingAttributeMapping { .. } => {
                ErrorKind::ConflictingAttributeMapping
            }
            SchemaError::DuplicateEntityName(_) => ErrorKind::DuplicateEntityName,
            SchemaError::IncompatibleClient { .. } => ErrorKind::IncompatibleClient,
        }
    }
}

fn format_capabilities(capabilities: &[Capability]) -> String {
    capabilities
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
