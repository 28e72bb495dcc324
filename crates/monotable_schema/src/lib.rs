//! Single-Table Schema Normalization
//!
//! Many logical record types (entities) share one physical table. This crate
//! takes a loosely written table declaration and produces one canonical,
//! internally consistent schema before any data operation runs:
//!
//! 1. **Attributes**: bare type names and descriptor objects become
//!    [`AttributeType`]s; the discriminator attribute is always present
//! 2. **Indexes**: each secondary index is classified LOCAL or GLOBAL from
//!    its keys alone
//! 3. **Entities**: each entity's logical attributes are merged into the
//!    shared physical catalog, with per-entity name mappings and type checks
//! 4. **Client**: a store client is accepted only if it advertises the
//!    operations the execution layer needs
//!
//! Any inconsistency is a [`SchemaError`]; a failed step leaves no partial
//! table or half-merged catalog behind.
//!
//! # Modules
//!
//! - [`attribute`]: attribute types and the normalized catalog
//! - [`index`]: secondary index classification
//! - [`entity`]: entity input types
//! - [`binder`]: merging entities into a table's catalog
//! - [`client`]: store client capability checks
//! - [`table`]: table construction and the shared, lock-guarded table
//! - [`config`]: serialized table documents

pub mod attribute;
pub mod binder;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod index;
pub mod table;

pub use attribute::{
    AttributeCatalog, AttributeDef, AttributeDescriptor, AttributeSpec, AttributeType, ScalarType,
    SetMember, DEFAULT_ENTITY_FIELD,
};
pub use binder::EntityRegistry;
pub use client::{Capability, ClientManifest, StoreClient};
pub use config::{OneOrMany, TableConfig};
pub use entity::{Entity, EntityAttribute, EntityBuilder, EntityConfig, EntityDefinition};
pub use error::{ErrorKind, SchemaError, SchemaResult};
pub use index::{classify_index, IndexDef, IndexSpec, IndexType};
pub use table::{PrimaryKey, Table, TableDefinition, TableSchema};
