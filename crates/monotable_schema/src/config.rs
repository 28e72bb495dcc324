//! Table documents.
//!
//! A table document is the serialized construction input: the same shape a
//! caller passes in code, with camelCase keys. `entities` may be one entity
//! object or an array, and the client is described by the capabilities it
//! declares.

use crate::attribute::AttributeSpec;
use crate::client::ClientManifest;
use crate::entity::EntityConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::index::IndexSpec;
use crate::table::TableDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value or a list of them.
// `Many` is tried first so an empty array is not read as a defaulted `One`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Parsed table document.
///
/// Required fields are optional here so that their absence is reported as
/// [`SchemaError::MissingRequiredField`] rather than as a parse error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub partition_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_field: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeSpec>,
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<OneOrMany<EntityConfig>>,
    #[serde(default = "default_true")]
    pub auto_execute: bool,
    #[serde(default = "default_true")]
    pub auto_parse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientManifest>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: None,
            partition_key: None,
            sort_key: None,
            entity_field: None,
            attributes: BTreeMap::new(),
            indexes: BTreeMap::new(),
            entities: None,
            auto_execute: true,
            auto_parse: true,
            client: None,
        }
    }
}

impl TableConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert the document into a [`TableDefinition`], building its entities.
    pub fn into_definition(self) -> SchemaResult<TableDefinition> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SchemaError::missing_field("name"))?;
        let partition_key = self
            .partition_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SchemaError::missing_field("partitionKey"))?;

        let mut definition = TableDefinition::new(name, partition_key)
            .with_auto_execute(self.auto_execute)
            .with_auto_parse(self.auto_parse);
        definition.sort_key = self.sort_key;
        definition.entity_field = self.entity_field;
        definition.attributes = self.attributes;
        definition.indexes = self.indexes;

        for entity in self.entities.map(OneOrMany::into_vec).unwrap_or_default() {
            definition = definition.with_entity(entity.into_entity()?);
        }
        if let Some(manifest) = self.client {
            definition = definition.with_client(manifest.into_client());
        }

        Ok(definition)
    }
}
