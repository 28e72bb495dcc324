//! Entity registration.
//!
//! Registration merges an entity's logical attributes into the table's
//! physical catalog. The merge runs on a copy of the registry; the copy only
//! replaces the original once every attribute has been reconciled.

use crate::attribute::{AttributeCatalog, AttributeDef, AttributeType};
use crate::entity::{EntityAttribute, EntityDefinition};
use crate::error::{SchemaError, SchemaResult};
use crate::table::PrimaryKey;

/// Mutable half of a table: the attribute catalog and registered entity names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityRegistry {
    attributes: AttributeCatalog,
    entities: Vec<String>,
}

/// Where one logical attribute lands in the physical catalog.
#[derive(Debug)]
struct Placement<'a> {
    logical: &'a str,
    physical: &'a str,
    attribute_type: AttributeType,
}

impl EntityRegistry {
    pub fn new(attributes: AttributeCatalog) -> Self {
        Self {
            attributes,
            entities: Vec::new(),
        }
    }

    pub fn attributes(&self) -> &AttributeCatalog {
        &self.attributes
    }

    /// Registered entity names, in registration order
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e == name)
    }

    /// Register `entity`, returning the merged registry.
    ///
    /// `self` is left untouched whether or not registration succeeds.
    pub fn register<E>(
        &self,
        key: &PrimaryKey,
        entity_field: &str,
        entity: &E,
    ) -> SchemaResult<Self>
    where
        E: EntityDefinition + ?Sized,
    {
        let entity_name = entity.name();
        if entity_name.is_empty() {
            return Err(SchemaError::missing_field("entity name"));
        }
        if self.contains_entity(entity_name) {
            return Err(SchemaError::DuplicateEntityName(entity_name.to_string()));
        }

        let placements = place_attributes(key, entity)?;

        let mut merged = self.clone();
        for placement in &placements {
            merged.merge(entity_name, placement)?;
        }
        if let Some(alias) = entity.type_alias() {
            merged.merge(
                entity_name,
                &Placement {
                    logical: alias,
                    physical: entity_field,
                    attribute_type: AttributeType::STRING,
                },
            )?;
        }
        merged.entities.push(entity_name.to_string());

        tracing::info!(
            "Registered entity '{}' ({} attributes)",
            entity_name,
            placements.len()
        );
        Ok(merged)
    }

    fn merge(&mut self, entity: &str, placement: &Placement<'_>) -> SchemaResult<()> {
        let Some(existing) = self.attributes.get_mut(placement.physical) else {
            tracing::debug!(
                "Entity '{}' adds attribute '{}' as {}",
                entity,
                placement.physical,
                placement.attribute_type
            );
            self.attributes.insert(
                placement.physical,
                AttributeDef::new(placement.attribute_type).with_mapping(entity, placement.logical),
            );
            return Ok(());
        };

        if !existing
            .attribute_type
            .is_compatible_with(&placement.attribute_type)
        {
            return Err(SchemaError::ConflictingAttributeMapping {
                attribute: placement.physical.to_string(),
                entity: entity.to_string(),
                existing: existing.attribute_type.to_string(),
                requested: placement.attribute_type.to_string(),
            });
        }

        match existing.mapping_for(entity) {
            Some(logical) if logical != placement.logical => {
                Err(SchemaError::ConflictingAttributeMapping {
                    attribute: placement.physical.to_string(),
                    entity: entity.to_string(),
                    existing: format!("mapped as '{}'", logical),
                    requested: format!("'{}'", placement.logical),
                })
            }
            _ => {
                existing
                    .mappings
                    .insert(entity.to_string(), placement.logical.to_string());
                Ok(())
            }
        }
    }
}

/// Resolve every logical attribute of `entity` to its physical name, checking
/// the entity's key roles against the table's primary key.
fn place_attributes<'a, E>(key: &'a PrimaryKey, entity: &'a E) -> SchemaResult<Vec<Placement<'a>>>
where
    E: EntityDefinition + ?Sized,
{
    let entity_name = entity.name();
    let attributes = entity.attributes();

    let partition_keys: Vec<&str> = attributes
        .iter()
        .filter(|(_, attr)| attr.partition_key)
        .map(|(name, _)| name.as_str())
        .collect();
    let sort_keys: Vec<&str> = attributes
        .iter()
        .filter(|(_, attr)| attr.sort_key)
        .map(|(name, _)| name.as_str())
        .collect();

    if partition_keys.len() != 1 {
        return Err(SchemaError::invalid_key_schema(
            entity_name,
            format!(
                "exactly one partitionKey attribute is required, found {}",
                partition_keys.len()
            ),
        ));
    }
    if sort_keys.len() > 1 {
        return Err(SchemaError::invalid_key_schema(
            entity_name,
            format!(
                "at most one sortKey attribute is allowed, found {} ({})",
                sort_keys.len(),
                sort_keys.join(", ")
            ),
        ));
    }

    let mut placements: Vec<Placement<'a>> = Vec::with_capacity(attributes.len());
    for (logical, attr) in attributes {
        let physical = physical_name(key, entity_name, logical, attr)?;

        if let Some(previous) = placements.iter().find(|p| p.physical == physical) {
            return Err(SchemaError::ConflictingAttributeMapping {
                attribute: physical.to_string(),
                entity: entity_name.to_string(),
                existing: format!("mapped as '{}'", previous.logical),
                requested: format!("'{}'", logical),
            });
        }

        placements.push(Placement {
            logical,
            physical,
            attribute_type: attr.attribute_type,
        });
    }

    Ok(placements)
}

fn physical_name<'a>(
    key: &'a PrimaryKey,
    entity: &str,
    logical: &'a str,
    attr: &'a EntityAttribute,
) -> SchemaResult<&'a str> {
    let slot = match (attr.partition_key, attr.sort_key) {
        (true, true) => {
            return Err(SchemaError::invalid_key_schema(
                entity,
                format!("attribute '{}' cannot be both partitionKey and sortKey", logical),
            ));
        }
        (true, false) => Some(("partitionKey", key.partition_key.as_str())),
        (false, true) => match key.sort_key.as_deref() {
            Some(sort_key) => Some(("sortKey", sort_key)),
            None => {
                return Err(SchemaError::invalid_key_schema(
                    entity,
                    format!(
                        "attribute '{}' is a sortKey but the table has no sort key",
                        logical
                    ),
                ));
            }
        },
        (false, false) => None,
    };

    let Some((role, table_key)) = slot else {
        return Ok(attr.map.as_deref().unwrap_or(logical));
    };

    if !attr.attribute_type.is_key_type() {
        return Err(SchemaError::invalid_key_schema(
            entity,
            format!(
                "{} attribute '{}' must be string, number, or binary, not {}",
                role, logical, attr.attribute_type
            ),
        ));
    }
    if let Some(mapped) = attr.map.as_deref() {
        if mapped != table_key {
            return Err(SchemaError::invalid_key_schema(
                entity,
                format!(
                    "{} attribute '{}' maps to '{}' but the table {} is '{}'",
                    role, logical, mapped, role, table_key
                ),
            ));
        }
    }
    Ok(table_key)
}
