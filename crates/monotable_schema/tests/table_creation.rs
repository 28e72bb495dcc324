//! End-to-end tests for table construction and entity registration.
//!
//! Everything goes through the public API: definitions in code, table
//! documents in JSON/TOML, and concurrent registration on a shared table.

use monotable_schema::{
    AttributeType, Capability, ClientManifest, Entity, EntityAttribute, ErrorKind, IndexSpec,
    IndexType, SchemaError, SetMember, StoreClient, Table, TableConfig, TableDefinition,
};
use serde_json::json;
use std::sync::Arc;

fn key_only_entity(name: &str) -> Entity {
    Entity::builder(name)
        .attribute("pk", EntityAttribute::partition_key())
        .build()
        .unwrap()
}

// =============================================================================
// TABLE CONSTRUCTION
// =============================================================================

#[test]
fn test_creates_table_with_minimum_options() {
    let table = TableDefinition::new("test-table", "pk").build().unwrap();
    let schema = table.schema();

    assert_eq!(schema.name, "test-table");
    assert_eq!(schema.partition_key, "pk");
    assert_eq!(schema.sort_key, None);
    assert_eq!(schema.entity_field, "_tp");
    assert!(schema.indexes.is_empty());
    assert_eq!(
        serde_json::to_value(&schema.attributes).unwrap(),
        json!({ "_tp": { "type": "string" } })
    );
    assert!(schema.auto_execute);
    assert!(schema.auto_parse);
    assert!(schema.entities.is_empty());
}

#[test]
fn test_creates_table_with_options() {
    let table = TableDefinition::new("test-table", "pk")
        .with_sort_key("sk")
        .with_entity_field("entity")
        .with_auto_execute(false)
        .with_auto_parse(false)
        .build()
        .unwrap();

    assert_eq!(table.sort_key(), Some("sk"));
    assert_eq!(table.entity_field(), "entity");
    assert_eq!(
        serde_json::to_value(table.attributes()).unwrap(),
        json!({ "entity": { "type": "string" } })
    );
    assert!(!table.auto_execute());
    assert!(!table.auto_parse());
    assert!(table.entities().is_empty());
}

#[test]
fn test_creates_table_with_attributes() {
    let table = TableDefinition::new("test-table", "pk")
        .with_attribute("stringAttr", "string")
        .with_attribute("numberAttr", "number")
        .with_attribute("binaryAttr", "binary")
        .with_attribute("booleanAttr", "boolean")
        .with_attribute("listAttr", "list")
        .with_attribute("mapAttr", "map")
        .with_attribute("stringSetAttr", "set")
        .with_attribute("numberSetAttr", AttributeType::set_of(SetMember::Number))
        .with_attribute("binarySetAttr", AttributeType::set_of(SetMember::Binary))
        .build()
        .unwrap();

    assert_eq!(
        serde_json::to_value(table.attributes()).unwrap(),
        json!({
            "stringAttr": { "type": "string" },
            "numberAttr": { "type": "number" },
            "binaryAttr": { "type": "binary" },
            "booleanAttr": { "type": "boolean" },
            "listAttr": { "type": "list" },
            "mapAttr": { "type": "map" },
            "stringSetAttr": { "type": "set" },
            "numberSetAttr": { "type": "set", "setType": "number" },
            "binarySetAttr": { "type": "set", "setType": "binary" },
            "_tp": { "type": "string" }
        })
    );
}

#[test]
fn test_invalid_attribute_type_fails() {
    let err = TableDefinition::new("test-table", "pk")
        .with_attribute("when", "timestamp")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAttributeType);
}

#[test]
fn test_type_names_are_not_case_folded() {
    let err = TableDefinition::new("test-table", "pk")
        .with_attribute("a", "STRING")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAttributeType);
}

#[test]
fn test_creates_table_with_indexes() {
    let table = TableDefinition::new("test-table", "pk")
        .with_index(
            "GSI1",
            IndexSpec::new()
                .with_partition_key("GSI1pk")
                .with_sort_key("GSI1sk"),
        )
        .with_index("GSI2", IndexSpec::new().with_partition_key("GSI2pk"))
        .with_index(
            "LSI1",
            IndexSpec::new().with_partition_key("pk").with_sort_key("LSI1sk"),
        )
        .with_index("LSI2", IndexSpec::new().with_sort_key("LSI2sk"))
        .build()
        .unwrap();

    assert_eq!(table.index("GSI1").unwrap().index_type, IndexType::Global);
    assert_eq!(table.index("LSI1").unwrap().index_type, IndexType::Local);
    assert_eq!(
        serde_json::to_value(table.indexes()).unwrap(),
        json!({
            "GSI1": { "partitionKey": "GSI1pk", "sortKey": "GSI1sk", "type": "GSI" },
            "GSI2": { "partitionKey": "GSI2pk", "type": "GSI" },
            "LSI1": { "sortKey": "LSI1sk", "type": "LSI" },
            "LSI2": { "sortKey": "LSI2sk", "type": "LSI" }
        })
    );
    assert_eq!(
        serde_json::to_value(table.attributes()).unwrap(),
        json!({ "_tp": { "type": "string" } })
    );
}

#[test]
fn test_keyless_index_fails() {
    let err = TableDefinition::new("test-table", "pk")
        .with_index("Nothing", IndexSpec::new())
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIndexDefinition);
}

// =============================================================================
// CLIENT BINDING
// =============================================================================

#[test]
fn test_creates_table_with_client() {
    let table = TableDefinition::new("test-table", "pk")
        .with_client(ClientManifest::full("DocumentClient").into_client())
        .build()
        .unwrap();

    assert_eq!(table.client().unwrap().client_name(), "DocumentClient");
    assert_eq!(table.entity_field(), "_tp");
    assert!(table.entities().is_empty());
}

#[test]
fn test_creates_table_then_binds_client() {
    let table = TableDefinition::new("test-table", "pk").build().unwrap();
    assert!(!table.has_client());

    table
        .bind_client(ClientManifest::full("DocumentClient").into_client())
        .unwrap();

    assert_eq!(table.client().unwrap().client_name(), "DocumentClient");
    assert_eq!(
        serde_json::to_value(table.attributes()).unwrap(),
        json!({ "_tp": { "type": "string" } })
    );
}

/// A client implemented outside the crate is judged only by what it supports.
struct NoBatchClient;

impl StoreClient for NoBatchClient {
    fn supports(&self, capability: Capability) -> bool {
        !matches!(capability, Capability::BatchGet | Capability::BatchWrite)
    }

    fn client_name(&self) -> &str {
        "no-batch"
    }
}

#[test]
fn test_incompatible_client_keeps_previous_binding() {
    let table = TableDefinition::new("test-table", "pk").build().unwrap();
    table
        .bind_client(ClientManifest::full("original").into_client())
        .unwrap();

    let err = table.bind_client(Arc::new(NoBatchClient)).unwrap_err();
    match err {
        SchemaError::IncompatibleClient { client, missing } => {
            assert_eq!(client, "no-batch");
            assert_eq!(missing, vec![Capability::BatchGet, Capability::BatchWrite]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(table.client().unwrap().client_name(), "original");
}

// =============================================================================
// ENTITY REGISTRATION
// =============================================================================

#[test]
fn test_creates_table_with_entity() {
    let table = TableDefinition::new("test-table", "pk")
        .with_entity(key_only_entity("TestEnt"))
        .build()
        .unwrap();

    assert_eq!(table.entities(), vec!["TestEnt".to_string()]);
    assert_eq!(
        serde_json::to_value(table.attributes()).unwrap(),
        json!({
            "_tp": { "type": "string", "mappings": { "TestEnt": "entity" } },
            "pk": { "type": "string", "mappings": { "TestEnt": "pk" } },
            "_ct": { "type": "string", "mappings": { "TestEnt": "created" } },
            "_md": { "type": "string", "mappings": { "TestEnt": "modified" } }
        })
    );
}

#[test]
fn test_shared_attribute_collects_mappings() {
    let user = Entity::builder("User")
        .attribute("userId", EntityAttribute::partition_key())
        .attribute("name", EntityAttribute::new(AttributeType::STRING).mapped_to("data"))
        .build()
        .unwrap();
    let team = Entity::builder("Team")
        .attribute("teamId", EntityAttribute::partition_key())
        .attribute("title", EntityAttribute::new(AttributeType::STRING).mapped_to("data"))
        .build()
        .unwrap();

    let table = TableDefinition::new("test-table", "pk")
        .with_entities([user, team])
        .build()
        .unwrap();

    let data = table.attribute("data").unwrap();
    assert_eq!(data.mapping_for("User"), Some("name"));
    assert_eq!(data.mapping_for("Team"), Some("title"));
    let pk = table.attribute("pk").unwrap();
    assert_eq!(pk.mapping_for("User"), Some("userId"));
    assert_eq!(pk.mapping_for("Team"), Some("teamId"));
    assert_eq!(table.entities(), vec!["User".to_string(), "Team".to_string()]);
}

#[test]
fn test_conflicting_types_fail_construction() {
    let user = Entity::builder("User")
        .attribute("userId", EntityAttribute::partition_key())
        .attribute("score", EntityAttribute::new(AttributeType::NUMBER))
        .build()
        .unwrap();
    let team = Entity::builder("Team")
        .attribute("teamId", EntityAttribute::partition_key())
        .attribute("score", EntityAttribute::new(AttributeType::STRING))
        .build()
        .unwrap();

    let err = TableDefinition::new("test-table", "pk")
        .with_entities([user, team])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::ConflictingAttributeMapping { ref attribute, ref entity, .. }
            if attribute == "score" && entity == "Team"
    ));
}

#[test]
fn test_entity_conflicting_with_table_attribute_fails() {
    let entity = Entity::builder("User")
        .attribute("userId", EntityAttribute::partition_key())
        .attribute("tags", EntityAttribute::new(AttributeType::set_of(SetMember::Number)))
        .build()
        .unwrap();

    let err = TableDefinition::new("test-table", "pk")
        .with_attribute("tags", "set")
        .with_entity(entity)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConflictingAttributeMapping);
}

#[test]
fn test_duplicate_entity_leaves_entities_unchanged() {
    let table = TableDefinition::new("test-table", "pk")
        .with_entity(key_only_entity("TestEnt"))
        .build()
        .unwrap();
    let before = table.schema();

    let err = table.add_entity(&key_only_entity("TestEnt")).unwrap_err();
    assert_eq!(err, SchemaError::DuplicateEntityName("TestEnt".into()));
    assert_eq!(table.entities(), vec!["TestEnt".to_string()]);
    assert_eq!(table.schema(), before);
}

#[test]
fn test_entity_added_after_construction() {
    let table = TableDefinition::new("test-table", "pk")
        .with_sort_key("sk")
        .build()
        .unwrap();

    let order = Entity::builder("Order")
        .attribute("orderId", EntityAttribute::partition_key())
        .attribute(
            "placedAt",
            EntityAttribute::new(AttributeType::NUMBER).as_sort_key(),
        )
        .timestamps(false)
        .build()
        .unwrap();
    table.add_entity(&order).unwrap();

    assert!(table.has_entity("Order"));
    assert_eq!(
        table.attribute("sk").unwrap().attribute_type,
        AttributeType::NUMBER
    );
    assert_eq!(table.attribute("sk").unwrap().mapping_for("Order"), Some("placedAt"));
}

#[test]
fn test_entity_without_partition_key_fails() {
    let entity = Entity::builder("Loose")
        .attribute("name", EntityAttribute::default())
        .build()
        .unwrap();
    let err = TableDefinition::new("test-table", "pk")
        .with_entity(entity)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEntityKeySchema);
}

#[test]
fn test_concurrent_registration_is_serialized() {
    let table = TableDefinition::new("test-table", "pk").build().unwrap();
    let names: Vec<String> = (0..16).map(|i| format!("Entity{i}")).collect();

    std::thread::scope(|scope| {
        for name in &names {
            let table = &table;
            scope.spawn(move || {
                let entity = Entity::builder(name.as_str())
                    .attribute("id", EntityAttribute::partition_key())
                    .build()
                    .unwrap();
                table.add_entity(&entity).unwrap();
                // Readers only ever see fully merged registrations.
                let pk = table.attribute("pk").unwrap();
                assert_eq!(pk.mapping_for(name), Some("id"));
            });
        }
    });

    let mut registered = table.entities();
    registered.sort();
    let mut expected = names.clone();
    expected.sort();
    assert_eq!(registered, expected);
    assert_eq!(table.attribute("pk").unwrap().mappings.len(), 16);
    assert_eq!(table.attribute("_tp").unwrap().mappings.len(), 16);
}

// =============================================================================
// TABLE DOCUMENTS
// =============================================================================

#[test]
fn test_json_document_scenario() {
    let config = TableConfig::from_json(
        r#"{
            "name": "test-table",
            "partitionKey": "pk",
            "indexes": {
                "GSI1": { "partitionKey": "GSI1pk", "sortKey": "GSI1sk" },
                "LSI1": { "partitionKey": "pk", "sortKey": "LSI1sk" }
            },
            "entities": {
                "name": "TestEnt",
                "attributes": { "pk": { "partitionKey": true } }
            }
        }"#,
    )
    .unwrap();
    let table = Table::from_config(config).unwrap();

    assert_eq!(table.index("GSI1").unwrap().index_type, IndexType::Global);
    assert_eq!(table.index("LSI1").unwrap().index_type, IndexType::Local);
    assert_eq!(table.entities(), vec!["TestEnt".to_string()]);
    let attributes = table.attributes();
    assert!(attributes.contains("pk"));
    assert!(attributes.contains("_tp"));
}

#[test]
fn test_document_typos_are_parse_errors() {
    assert!(TableConfig::from_json(
        r#"{ "name": "test-table", "partitionKey": "pk", "sortkey": "sk" }"#
    )
    .is_err());
    assert!(toml::from_str::<TableConfig>(
        r#"
name = "test-table"
partitionKey = "pk"

[attributes]
scores = { type = "set", settype = "number" }
"#
    )
    .is_err());
}

#[test]
fn test_toml_document() {
    let config: TableConfig = toml::from_str(
        r#"
name = "orders"
partitionKey = "pk"
sortKey = "sk"
entityField = "kind"
autoParse = false

[attributes]
total = "number"
tags = { type = "set", setType = "string" }

[indexes.ByCustomer]
partitionKey = "customerId"

[[entities]]
name = "Order"
timestamps = false

[entities.attributes]
orderId = { partitionKey = true }
line = { sortKey = true }
total = "number"

[client]
name = "ddb"
capabilities = ["get", "put", "update", "delete", "query", "scan", "batchGet", "batchWrite"]
"#,
    )
    .unwrap();
    let table = Table::from_config(config).unwrap();
    let schema = table.schema();

    assert_eq!(schema.entity_field, "kind");
    assert!(!schema.auto_parse);
    assert_eq!(schema.indexes["ByCustomer"].index_type, IndexType::Global);
    assert_eq!(
        table.attribute("total").unwrap().mapping_for("Order"),
        Some("total")
    );
    assert_eq!(table.attribute("kind").unwrap().mapping_for("Order"), Some("entity"));
    assert_eq!(table.client().unwrap().client_name(), "ddb");
}
