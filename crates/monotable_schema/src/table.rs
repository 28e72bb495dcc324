//! Table schema.
//!
//! A [`Table`] is built once from a [`TableDefinition`] and is read-mostly
//! afterwards. Its name, keys, discriminator field, indexes and behavior flags
//! never change. The attribute catalog and entity list change only through
//! entity registration, and the store client only through binding; both go
//! through a single lock so readers see either the old or the new state.

use crate::attribute::{AttributeCatalog, AttributeDef, AttributeSpec, DEFAULT_ENTITY_FIELD};
use crate::binder::EntityRegistry;
use crate::client::{check_client, StoreClient};
use crate::config::TableConfig;
use crate::entity::EntityDefinition;
use crate::error::{SchemaError, SchemaResult};
use crate::index::{classify_index, IndexDef, IndexSpec};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Physical primary key of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryKey {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl PrimaryKey {
    pub fn new(partition_key: impl Into<String>, sort_key: Option<impl Into<String>>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.map(Into::into),
        }
    }
}

/// Everything needed to build a [`Table`].
pub struct TableDefinition {
    pub name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    pub entity_field: Option<String>,
    pub attributes: BTreeMap<String, AttributeSpec>,
    pub indexes: BTreeMap<String, IndexSpec>,
    pub entities: Vec<Box<dyn EntityDefinition>>,
    pub auto_execute: bool,
    pub auto_parse: bool,
    pub client: Option<Arc<dyn StoreClient>>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
            entity_field: None,
            attributes: BTreeMap::new(),
            indexes: BTreeMap::new(),
            entities: Vec::new(),
            auto_execute: true,
            auto_parse: true,
            client: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Rename the discriminator attribute (default `_tp`)
    pub fn with_entity_field(mut self, field: impl Into<String>) -> Self {
        self.entity_field = Some(field.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, spec: impl Into<AttributeSpec>) -> Self {
        self.attributes.insert(name.into(), spec.into());
        self
    }

    pub fn with_index(mut self, name: impl Into<String>, spec: IndexSpec) -> Self {
        self.indexes.insert(name.into(), spec);
        self
    }

    pub fn with_entity(mut self, entity: impl EntityDefinition + 'static) -> Self {
        self.entities.push(Box::new(entity));
        self
    }

    pub fn with_entities<E>(mut self, entities: impl IntoIterator<Item = E>) -> Self
    where
        E: EntityDefinition + 'static,
    {
        self.entities
            .extend(entities.into_iter().map(|e| Box::new(e) as Box<dyn EntityDefinition>));
        self
    }

    pub fn with_auto_execute(mut self, enabled: bool) -> Self {
        self.auto_execute = enabled;
        self
    }

    pub fn with_auto_parse(mut self, enabled: bool) -> Self {
        self.auto_parse = enabled;
        self
    }

    pub fn with_client(mut self, client: Arc<dyn StoreClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> SchemaResult<Table> {
        Table::new(self)
    }
}

/// Serializable snapshot of a table's canonical schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    pub partition_key: String,
    pub sort_key: Option<String>,
    pub entity_field: String,
    pub attributes: AttributeCatalog,
    pub indexes: BTreeMap<String, IndexDef>,
    pub entities: Vec<String>,
    pub auto_execute: bool,
    pub auto_parse: bool,
}

#[derive(Default)]
struct TableState {
    registry: EntityRegistry,
    client: Option<Arc<dyn StoreClient>>,
}

/// A validated single-table schema.
pub struct Table {
    name: String,
    key: PrimaryKey,
    entity_field: String,
    indexes: BTreeMap<String, IndexDef>,
    auto_execute: bool,
    auto_parse: bool,
    state: RwLock<TableState>,
}

impl Table {
    /// Build a table, registering any supplied entities in order and checking
    /// any supplied client. Nothing is returned unless every step succeeds.
    pub fn new(definition: TableDefinition) -> SchemaResult<Self> {
        let TableDefinition {
            name,
            partition_key,
            sort_key,
            entity_field,
            attributes,
            indexes,
            entities,
            auto_execute,
            auto_parse,
            client,
        } = definition;

        if name.is_empty() {
            return Err(SchemaError::missing_field("name"));
        }
        if partition_key.is_empty() {
            return Err(SchemaError::missing_field("partitionKey"));
        }
        if sort_key.as_deref() == Some("") {
            return Err(SchemaError::missing_field("sortKey"));
        }
        let entity_field = match entity_field {
            Some(field) if field.is_empty() => {
                return Err(SchemaError::missing_field("entityField"));
            }
            Some(field) => field,
            None => DEFAULT_ENTITY_FIELD.to_string(),
        };

        let key = PrimaryKey {
            partition_key,
            sort_key,
        };

        let catalog = AttributeCatalog::normalize(&attributes, &entity_field)?;
        check_key_attributes(&catalog, &key)?;

        let indexes = indexes
            .iter()
            .map(|(index_name, spec)| {
                classify_index(index_name, spec, &key.partition_key)
                    .map(|def| (index_name.clone(), def))
            })
            .collect::<SchemaResult<BTreeMap<_, _>>>()?;

        let mut registry = EntityRegistry::new(catalog);
        for entity in &entities {
            registry = registry.register(&key, &entity_field, entity.as_ref())?;
        }

        if let Some(client) = &client {
            check_client(client.as_ref())?;
        }

        tracing::info!(
            "Built table '{}' ({} attributes, {} indexes, {} entities)",
            name,
            registry.attributes().len(),
            indexes.len(),
            registry.entities().len()
        );

        Ok(Self {
            name,
            key,
            entity_field,
            indexes,
            auto_execute,
            auto_parse,
            state: RwLock::new(TableState { registry, client }),
        })
    }

    /// Build a table from a parsed table document.
    pub fn from_config(config: TableConfig) -> SchemaResult<Self> {
        config.into_definition()?.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &PrimaryKey {
        &self.key
    }

    pub fn partition_key(&self) -> &str {
        &self.key.partition_key
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.key.sort_key.as_deref()
    }

    /// Name of the discriminator attribute
    pub fn entity_field(&self) -> &str {
        &self.entity_field
    }

    pub fn indexes(&self) -> &BTreeMap<String, IndexDef> {
        &self.indexes
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indexes.get(name)
    }

    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    pub fn auto_parse(&self) -> bool {
        self.auto_parse
    }

    /// Snapshot of the attribute catalog
    pub fn attributes(&self) -> AttributeCatalog {
        self.read().registry.attributes().clone()
    }

    pub fn attribute(&self, name: &str) -> Option<AttributeDef> {
        self.read().registry.attributes().get(name).cloned()
    }

    /// Registered entity names, in registration order
    pub fn entities(&self) -> Vec<String> {
        self.read().registry.entities().to_vec()
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.read().registry.contains_entity(name)
    }

    /// Register an entity after construction.
    pub fn add_entity<E>(&self, entity: &E) -> SchemaResult<()>
    where
        E: EntityDefinition + ?Sized,
    {
        let mut state = self.write();
        match state.registry.register(&self.key, &self.entity_field, entity) {
            Ok(registry) => {
                state.registry = registry;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    "Rejected entity '{}' on table '{}': {}",
                    entity.name(),
                    self.name,
                    err
                );
                Err(err)
            }
        }
    }

    /// Register several entities as one unit: either all are added or none.
    pub fn add_entities<'a, I>(&self, entities: I) -> SchemaResult<()>
    where
        I: IntoIterator<Item = &'a dyn EntityDefinition>,
    {
        let mut state = self.write();
        let mut registry = state.registry.clone();
        for entity in entities {
            registry = registry.register(&self.key, &self.entity_field, entity)?;
        }
        state.registry = registry;
        Ok(())
    }

    /// Bind (or rebind) the store client. A rejected client leaves the
    /// previous binding in place.
    pub fn bind_client(&self, client: Arc<dyn StoreClient>) -> SchemaResult<()> {
        if let Err(err) = check_client(client.as_ref()) {
            tracing::warn!("Rejected client for table '{}': {}", self.name, err);
            return Err(err);
        }
        let mut state = self.write();
        tracing::info!(
            "Bound client '{}' to table '{}'",
            client.client_name(),
            self.name
        );
        state.client = Some(client);
        Ok(())
    }

    pub fn client(&self) -> Option<Arc<dyn StoreClient>> {
        self.read().client.clone()
    }

    pub fn has_client(&self) -> bool {
        self.read().client.is_some()
    }

    /// Consistent snapshot of the full canonical schema.
    pub fn schema(&self) -> TableSchema {
        let state = self.read();
        TableSchema {
            name: self.name.clone(),
            partition_key: self.key.partition_key.clone(),
            sort_key: self.key.sort_key.clone(),
            entity_field: self.entity_field.clone(),
            attributes: state.registry.attributes().clone(),
            indexes: self.indexes.clone(),
            entities: state.registry.entities().to_vec(),
            auto_execute: self.auto_execute,
            auto_parse: self.auto_parse,
        }
    }

    // State is only ever replaced wholesale, so a poisoned lock still guards
    // a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, TableState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TableState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("entity_field", &self.entity_field)
            .field("indexes", &self.indexes)
            .field("attributes", state.registry.attributes())
            .field("entities", &state.registry.entities())
            .field("auto_execute", &self.auto_execute)
            .field("auto_parse", &self.auto_parse)
            .field("client", &state.client.as_ref().map(|c| c.client_name()))
            .finish()
    }
}

fn check_key_attributes(catalog: &AttributeCatalog, key: &PrimaryKey) -> SchemaResult<()> {
    let key_names = std::iter::once(key.partition_key.as_str()).chain(key.sort_key.as_deref());
    for name in key_names {
        if let Some(def) = catalog.get(name) {
            if !def.attribute_type.is_key_type() {
                return Err(SchemaError::invalid_attribute(
                    name,
                    format!(
                        "key attributes must be string, number, or binary, not {}",
                        def.attribute_type
                    ),
                ));
            }
        }
    }
    Ok(())
}
