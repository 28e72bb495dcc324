//! Attribute Catalog
//!
//! Declarations arrive loosely typed: either a bare type name (`"number"`) or
//! a descriptor object (`{ "type": "set", "setType": "number" }`). They are
//! resolved here, once, into [`AttributeType`] and never carried further in
//! their loose form.

use crate::error::{SchemaError, SchemaResult};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Discriminator attribute used when a table does not rename it.
pub const DEFAULT_ENTITY_FIELD: &str = "_tp";

/// Non-set attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Number,
    Binary,
    Boolean,
    List,
    Map,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Number => "number",
            ScalarType::Binary => "binary",
            ScalarType::Boolean => "boolean",
            ScalarType::List => "list",
            ScalarType::Map => "map",
        }
    }
}

/// Member type of a set attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetMember {
    #[default]
    String,
    Number,
    Binary,
}

impl SetMember {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetMember::String => "string",
            SetMember::Number => "number",
            SetMember::Binary => "binary",
        }
    }
}

impl FromStr for SetMember {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(SetMember::String),
            "number" => Ok(SetMember::Number),
            "binary" => Ok(SetMember::Binary),
            _ => Err(format!(
                "unknown set member type '{}'. Expected: string, number, or binary",
                s
            )),
        }
    }
}

/// Resolved attribute type.
///
/// A set declared without a member type keeps `None` so the canonical form
/// can omit `setType`; [`AttributeType::member_type`] reports the effective
/// member (`string`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Scalar(ScalarType),
    Set(Option<SetMember>),
}

impl Default for AttributeType {
    fn default() -> Self {
        AttributeType::Scalar(ScalarType::String)
    }
}

impl AttributeType {
    pub const STRING: AttributeType = AttributeType::Scalar(ScalarType::String);
    pub const NUMBER: AttributeType = AttributeType::Scalar(ScalarType::Number);
    pub const BINARY: AttributeType = AttributeType::Scalar(ScalarType::Binary);
    pub const BOOLEAN: AttributeType = AttributeType::Scalar(ScalarType::Boolean);
    pub const LIST: AttributeType = AttributeType::Scalar(ScalarType::List);
    pub const MAP: AttributeType = AttributeType::Scalar(ScalarType::Map);
    pub const SET: AttributeType = AttributeType::Set(None);

    /// Set of the given member type, with the member recorded explicitly.
    pub fn set_of(member: SetMember) -> Self {
        AttributeType::Set(Some(member))
    }

    /// Resolve a type name plus optional set member name.
    ///
    /// `set_type` is only legal when `type_name` is `set`.
    pub fn parse(type_name: &str, set_type: Option<&str>) -> Result<Self, String> {
        let base: AttributeType = type_name.parse()?;
        match (base, set_type) {
            (AttributeType::Set(_), Some(member)) => Ok(AttributeType::Set(Some(member.parse()?))),
            (AttributeType::Scalar(scalar), Some(_)) => Err(format!(
                "setType is only allowed on set attributes, not '{}'",
                scalar.as_str()
            )),
            (base, None) => Ok(base),
        }
    }

    /// Type name as written in the canonical descriptor
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeType::Scalar(scalar) => scalar.as_str(),
            AttributeType::Set(_) => "set",
        }
    }

    /// Explicitly declared set member type, if any
    pub fn set_type(&self) -> Option<SetMember> {
        match self {
            AttributeType::Set(member) => *member,
            AttributeType::Scalar(_) => None,
        }
    }

    /// Effective set member type (implicit members are strings)
    pub fn member_type(&self) -> Option<SetMember> {
        match self {
            AttributeType::Set(member) => Some(member.unwrap_or_default()),
            AttributeType::Scalar(_) => None,
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, AttributeType::Set(_))
    }

    /// Returns true if the type can back a partition or sort key
    pub fn is_key_type(&self) -> bool {
        matches!(
            self,
            AttributeType::Scalar(ScalarType::String | ScalarType::Number | ScalarType::Binary)
        )
    }

    /// Two declarations of one physical attribute agree when their base type
    /// and effective set member match.
    pub fn is_compatible_with(&self, other: &AttributeType) -> bool {
        self.type_name() == other.type_name() && self.member_type() == other.member_type()
    }
}

impl FromStr for AttributeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Names are case-sensitive; "String" is not a type.
        match s {
            "string" => Ok(AttributeType::STRING),
            "number" => Ok(AttributeType::NUMBER),
            "binary" => Ok(AttributeType::BINARY),
            "boolean" => Ok(AttributeType::BOOLEAN),
            "list" => Ok(AttributeType::LIST),
            "map" => Ok(AttributeType::MAP),
            "set" => Ok(AttributeType::SET),
            _ => Err(format!(
                "unknown type '{}'. Expected: string, number, binary, boolean, list, map, or set",
                s
            )),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.set_type() {
            Some(member) => write!(f, "set<{}>", member.as_str()),
            None => write!(f, "{}", self.type_name()),
        }
    }
}

/// An attribute declaration as a caller writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeSpec {
    /// Bare type name, e.g. `"number"`
    Name(String),
    /// Descriptor object, e.g. `{ "type": "set", "setType": "binary" }`
    Descriptor(AttributeDescriptor),
}

/// Object form of an attribute declaration. Unknown keys are rejected so a
/// misspelled `setType` cannot silently fall back to a string set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDescriptor {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "setType", default, skip_serializing_if = "Option::is_none")]
    pub set_type: Option<String>,
}

impl AttributeSpec {
    /// Descriptor for a set with an explicit member type
    pub fn set_of(member: impl Into<String>) -> Self {
        AttributeSpec::Descriptor(AttributeDescriptor {
            type_name: "set".to_string(),
            set_type: Some(member.into()),
        })
    }

    /// Resolve this declaration for the attribute called `name`.
    pub fn resolve(&self, name: &str) -> SchemaResult<AttributeType> {
        let resolved = match self {
            AttributeSpec::Name(type_name) => AttributeType::parse(type_name, None),
            AttributeSpec::Descriptor(descriptor) => {
                AttributeType::parse(&descriptor.type_name, descriptor.set_type.as_deref())
            }
        };
        resolved.map_err(|reason| SchemaError::invalid_attribute(name, reason))
    }
}

impl From<&str> for AttributeSpec {
    fn from(type_name: &str) -> Self {
        AttributeSpec::Name(type_name.to_string())
    }
}

impl From<AttributeType> for AttributeSpec {
    fn from(attribute_type: AttributeType) -> Self {
        match attribute_type.set_type() {
            Some(member) => AttributeSpec::set_of(member.as_str()),
            None => AttributeSpec::Name(attribute_type.type_name().to_string()),
        }
    }
}

/// Canonical attribute descriptor: `{ type, setType?, mappings? }`.
///
/// `mappings` records, per entity name, the logical name that entity uses
/// for this physical attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeDef {
    pub attribute_type: AttributeType,
    pub mappings: BTreeMap<String, String>,
}

impl AttributeDef {
    pub fn new(attribute_type: AttributeType) -> Self {
        Self {
            attribute_type,
            mappings: BTreeMap::new(),
        }
    }

    /// Add a mapping for an entity
    pub fn with_mapping(mut self, entity: impl Into<String>, logical: impl Into<String>) -> Self {
        self.mappings.insert(entity.into(), logical.into());
        self
    }

    /// Logical name the given entity uses for this attribute
    pub fn mapping_for(&self, entity: &str) -> Option<&str> {
        self.mappings.get(entity).map(String::as_str)
    }
}

impl Serialize for AttributeDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let set_type = self.attribute_type.set_type();
        let len = 1 + usize::from(set_type.is_some()) + usize::from(!self.mappings.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.attribute_type.type_name())?;
        if let Some(member) = set_type {
            map.serialize_entry("setType", member.as_str())?;
        }
        if !self.mappings.is_empty() {
            map.serialize_entry("mappings", &self.mappings)?;
        }
        map.end()
    }
}

/// Physical attribute catalog of a table, keyed by attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct AttributeCatalog {
    attributes: BTreeMap<String, AttributeDef>,
}

impl AttributeCatalog {
    /// Normalize caller declarations into a canonical catalog.
    ///
    /// The discriminator attribute `entity_field` is always present with type
    /// `string`; declaring it with any other type is rejected.
    pub fn normalize(
        specs: &BTreeMap<String, AttributeSpec>,
        entity_field: &str,
    ) -> SchemaResult<Self> {
        let mut attributes = BTreeMap::new();

        for (name, spec) in specs {
            if name.is_empty() {
                return Err(SchemaError::invalid_attribute(
                    name,
                    "attribute name must not be empty",
                ));
            }
            let attribute_type = spec.resolve(name)?;
            tracing::debug!("Normalized attribute '{}' as {}", name, attribute_type);
            attributes.insert(name.clone(), AttributeDef::new(attribute_type));
        }

        match attributes.get(entity_field) {
            Some(def) if def.attribute_type != AttributeType::STRING => {
                return Err(SchemaError::invalid_attribute(
                    entity_field,
                    format!(
                        "entity field must be a string, declared as {}",
                        def.attribute_type
                    ),
                ));
            }
            _ => {
                attributes.insert(
                    entity_field.to_string(),
                    AttributeDef::new(AttributeType::STRING),
                );
            }
        }

        Ok(Self { attributes })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut AttributeDef> {
        self.attributes.get_mut(name)
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, def: AttributeDef) {
        self.attributes.insert(name.into(), def);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeDef)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_map(self) -> BTreeMap<String, AttributeDef> {
        self.attributes
    }
}
