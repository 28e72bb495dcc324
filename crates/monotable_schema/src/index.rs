//! Secondary index classification.
//!
//! An index that stays inside the table's partition space (no partition key
//! of its own, or the table's partition key) is LOCAL. An index that declares
//! a different partition key re-partitions the data and is GLOBAL.

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index classification relative to the table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "LSI")]
    Local,
    #[serde(rename = "GSI")]
    Global,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Local => "LSI",
            IndexType::Global => "GSI",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, IndexType::Local)
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A secondary index as declared by the caller. Both keys are optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl IndexSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = Some(key.into());
        self
    }

    pub fn with_sort_key(mut self, key: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self
    }
}

/// A classified index.
///
/// LOCAL indexes that reuse the table partition key do not repeat it:
/// `partition_key` is only kept when it differs from the table's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    #[serde(rename = "type")]
    pub index_type: IndexType,
}

impl IndexDef {
    /// Partition key used to query this index
    pub fn effective_partition_key<'a>(&'a self, table_partition_key: &'a str) -> &'a str {
        self.partition_key.as_deref().unwrap_or(table_partition_key)
    }
}

/// Classify one named index against the table's partition key.
pub fn classify_index(
    name: &str,
    spec: &IndexSpec,
    table_partition_key: &str,
) -> SchemaResult<IndexDef> {
    let partition_key = spec.partition_key.as_deref();
    let sort_key = spec.sort_key.as_deref();

    if partition_key == Some("") || sort_key == Some("") {
        return Err(SchemaError::invalid_index(name, "key names must not be empty"));
    }
    if partition_key.is_none() && sort_key.is_none() {
        return Err(SchemaError::invalid_index(
            name,
            "an index must declare a partitionKey, a sortKey, or both",
        ));
    }

    let def = match partition_key {
        None => IndexDef {
            partition_key: None,
            sort_key: sort_key.map(str::to_string),
            index_type: IndexType::Local,
        },
        Some(pk) if pk == table_partition_key => IndexDef {
            partition_key: None,
            sort_key: sort_key.map(str::to_string),
            index_type: IndexType::Local,
        },
        Some(pk) => IndexDef {
            partition_key: Some(pk.to_string()),
            sort_key: sort_key.map(str::to_string),
            index_type: IndexType::Global,
        },
    };

    tracing::debug!("Classified index '{}' as {}", name, def.index_type);
    Ok(def)
}
