//! Entity input types.
//!
//! An entity is a logical record type stored in a shared physical table. It
//! has its own logical attribute names and key roles; the binder maps them
//! onto the table's physical catalog.

use crate::attribute::AttributeType;
use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_CREATED_FIELD: &str = "_ct";
pub const DEFAULT_MODIFIED_FIELD: &str = "_md";
pub const DEFAULT_CREATED_ALIAS: &str = "created";
pub const DEFAULT_MODIFIED_ALIAS: &str = "modified";
pub const DEFAULT_TYPE_ALIAS: &str = "entity";

/// What the binder needs to know about an entity: its name and its logical
/// attribute map with key roles.
pub trait EntityDefinition {
    fn name(&self) -> &str;

    fn attributes(&self) -> &BTreeMap<String, EntityAttribute>;

    /// Logical name under which the entity exposes the table's discriminator
    fn type_alias(&self) -> Option<&str> {
        None
    }
}

/// One logical attribute of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityAttribute {
    pub attribute_type: AttributeType,
    pub partition_key: bool,
    pub sort_key: bool,
    /// Physical attribute name, when it differs from the logical name
    pub map: Option<String>,
}

impl EntityAttribute {
    pub fn new(attribute_type: AttributeType) -> Self {
        Self {
            attribute_type,
            ..Self::default()
        }
    }

    /// String attribute in the partition-key role
    pub fn partition_key() -> Self {
        Self::default().as_partition_key()
    }

    /// String attribute in the sort-key role
    pub fn sort_key() -> Self {
        Self::default().as_sort_key()
    }

    pub fn as_partition_key(mut self) -> Self {
        self.partition_key = true;
        self
    }

    pub fn as_sort_key(mut self) -> Self {
        self.sort_key = true;
        self
    }

    pub fn mapped_to(mut self, physical: impl Into<String>) -> Self {
        self.map = Some(physical.into());
        self
    }
}

/// An immutable entity schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    name: String,
    attributes: BTreeMap<String, EntityAttribute>,
    type_alias: String,
}

impl Entity {
    pub fn builder(name: impl Into<String>) -> EntityBuilder {
        EntityBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &BTreeMap<String, EntityAttribute> {
        &self.attributes
    }

    pub fn attribute(&self, logical: &str) -> Option<&EntityAttribute> {
        self.attributes.get(logical)
    }

    pub fn type_alias(&self) -> &str {
        &self.type_alias
    }
}

impl EntityDefinition for Entity {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &BTreeMap<String, EntityAttribute> {
        &self.attributes
    }

    fn type_alias(&self) -> Option<&str> {
        Some(&self.type_alias)
    }
}

/// Builder for [`Entity`].
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    name: String,
    attributes: BTreeMap<String, EntityAttribute>,
    timestamps: bool,
    created: String,
    modified: String,
    created_alias: String,
    modified_alias: String,
    type_alias: String,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            timestamps: true,
            created: DEFAULT_CREATED_FIELD.to_string(),
            modified: DEFAULT_MODIFIED_FIELD.to_string(),
            created_alias: DEFAULT_CREATED_ALIAS.to_string(),
            modified_alias: DEFAULT_MODIFIED_ALIAS.to_string(),
            type_alias: DEFAULT_TYPE_ALIAS.to_string(),
        }
    }

    pub fn attribute(mut self, logical: impl Into<String>, attribute: EntityAttribute) -> Self {
        self.attributes.insert(logical.into(), attribute);
        self
    }

    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn created(mut self, physical: impl Into<String>) -> Self {
        self.created = physical.into();
        self
    }

    pub fn modified(mut self, physical: impl Into<String>) -> Self {
        self.modified = physical.into();
        self
    }

    pub fn created_alias(mut self, logical: impl Into<String>) -> Self {
        self.created_alias = logical.into();
        self
    }

    pub fn modified_alias(mut self, logical: impl Into<String>) -> Self {
        self.modified_alias = logical.into();
        self
    }

    pub fn type_alias(mut self, logical: impl Into<String>) -> Self {
        self.type_alias = logical.into();
        self
    }

    /// Validate and freeze the entity.
    ///
    /// With timestamps on, the created/modified attributes are added under
    /// their aliases unless the caller already declared those logical names.
    pub fn build(self) -> SchemaResult<Entity> {
        if self.name.is_empty() {
            return Err(SchemaError::missing_field("entity name"));
        }

        let mut attributes = self.attributes;
        if self.timestamps {
            for (alias, physical) in [
                (self.created_alias, self.created),
                (self.modified_alias, self.modified),
            ] {
                attributes
                    .entry(alias)
                    .or_insert_with(|| EntityAttribute::new(AttributeType::STRING).mapped_to(physical));
            }
        }

        // Checked after the timestamp attributes are added so their names
        // are held to the same rules.
        if let Some(logical) = attributes.keys().find(|k| k.is_empty()) {
            return Err(SchemaError::invalid_attribute(
                logical.as_str(),
                format!("entity '{}' declares an attribute with an empty name", self.name),
            ));
        }
        if let Some((logical, _)) = attributes
            .iter()
            .find(|(_, attr)| attr.map.as_deref() == Some(""))
        {
            return Err(SchemaError::invalid_attribute(
                logical.as_str(),
                "mapped physical name must not be empty",
            ));
        }
        if self.type_alias.is_empty() {
            return Err(SchemaError::missing_field("entity typeAlias"));
        }

        Ok(Entity {
            name: self.name,
            attributes,
            type_alias: self.type_alias,
        })
    }
}

/// Entity attribute as written in a table document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityAttributeSpec {
    /// Bare type name
    Name(String),
    /// Descriptor with optional type (default `string`) and key roles
    Descriptor(EntityAttributeObject),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityAttributeObject {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_type: Option<String>,
    #[serde(default)]
    pub partition_key: bool,
    #[serde(default)]
    pub sort_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
}

impl EntityAttributeSpec {
    fn resolve(&self, logical: &str) -> SchemaResult<EntityAttribute> {
        let (type_name, set_type, object) = match self {
            EntityAttributeSpec::Name(type_name) => (Some(type_name.as_str()), None, None),
            EntityAttributeSpec::Descriptor(obj) => {
                (obj.type_name.as_deref(), obj.set_type.as_deref(), Some(obj))
            }
        };

        let attribute_type = AttributeType::parse(type_name.unwrap_or("string"), set_type)
            .map_err(|reason| SchemaError::invalid_attribute(logical, reason))?;

        let mut attribute = EntityAttribute::new(attribute_type);
        if let Some(obj) = object {
            attribute.partition_key = obj.partition_key;
            attribute.sort_key = obj.sort_key;
            attribute.map = obj.map.clone();
        }
        Ok(attribute)
    }
}

/// Entity as written in a table document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, EntityAttributeSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_alias: Option<String>,
}

impl EntityConfig {
    pub fn into_entity(self) -> SchemaResult<Entity> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SchemaError::missing_field("entity name"))?;

        let mut builder = EntityBuilder::new(name);
        for (logical, spec) in &self.attributes {
            builder = builder.attribute(logical.clone(), spec.resolve(logical)?);
        }
        if let Some(enabled) = self.timestamps {
            builder = builder.timestamps(enabled);
        }
        if let Some(created) = self.created {
            builder = builder.created(created);
        }
        if let Some(modified) = self.modified {
            builder = builder.modified(modified);
        }
        if let Some(alias) = self.created_alias {
            builder = builder.created_alias(alias);
        }
        if let Some(alias) = self.modified_alias {
            builder = builder.modified_alias(alias);
        }
        if let Some(alias) = self.type_alias {
            builder = builder.type_alias(alias);
        }
        builder.build()
    }
}
