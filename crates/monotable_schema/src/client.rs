//! Store client binding.
//!
//! The schema layer never calls the store. It only checks that a client
//! advertises the operations the execution layer will need. The check is on
//! capabilities, not on the client's concrete type.

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One store operation a client can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    Get,
    Put,
    Update,
    Delete,
    Query,
    Scan,
    BatchGet,
    BatchWrite,
    TransactGet,
    TransactWrite,
}

impl Capability {
    /// Operations every bound client must support.
    pub const REQUIRED: [Capability; 8] = [
        Capability::Get,
        Capability::Put,
        Capability::Update,
        Capability::Delete,
        Capability::Query,
        Capability::Scan,
        Capability::BatchGet,
        Capability::BatchWrite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Get => "get",
            Capability::Put => "put",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::Query => "query",
            Capability::Scan => "scan",
            Capability::BatchGet => "batchGet",
            Capability::BatchWrite => "batchWrite",
            Capability::TransactGet => "transactGet",
            Capability::TransactWrite => "transactWrite",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Capability::Get),
            "put" => Ok(Capability::Put),
            "update" => Ok(Capability::Update),
            "delete" => Ok(Capability::Delete),
            "query" => Ok(Capability::Query),
            "scan" => Ok(Capability::Scan),
            "batchGet" => Ok(Capability::BatchGet),
            "batchWrite" => Ok(Capability::BatchWrite),
            "transactGet" => Ok(Capability::TransactGet),
            "transactWrite" => Ok(Capability::TransactWrite),
            _ => Err(format!("Unknown client capability: '{}'", s)),
        }
    }
}

/// Anything that can execute store operations on behalf of a table.
///
/// Implementors report which operations they support; the table rejects
/// clients that lack any of [`Capability::REQUIRED`].
pub trait StoreClient: Send + Sync {
    fn supports(&self, capability: Capability) -> bool;

    /// Name used in logs and errors
    fn client_name(&self) -> &str {
        "store-client"
    }
}

/// Required capabilities the client does not support, in canonical order.
pub fn missing_capabilities(client: &dyn StoreClient) -> Vec<Capability> {
    Capability::REQUIRED
        .iter()
        .copied()
        .filter(|c| !client.supports(*c))
        .collect()
}

/// Check a client's shape before it is bound.
pub fn check_client(client: &dyn StoreClient) -> SchemaResult<()> {
    let missing = missing_capabilities(client);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::IncompatibleClient {
            client: client.client_name().to_string(),
            missing,
        })
    }
}

/// A client known only by the capabilities it declares.
///
/// Table documents describe their client this way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientManifest {
    #[serde(default = "default_manifest_name")]
    pub name: String,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

fn default_manifest_name() -> String {
    "declared-client".to_string()
}

impl ClientManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capabilities: BTreeSet::new(),
        }
    }

    /// Manifest advertising every required capability
    pub fn full(name: impl Into<String>) -> Self {
        Self::new(name).with_capabilities(Capability::REQUIRED)
    }

    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.capabilities.remove(&capability);
        self
    }

    pub fn into_client(self) -> Arc<dyn StoreClient> {
        Arc::new(self)
    }
}

impl StoreClient for ClientManifest {
    fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn client_name(&self) -> &str {
        &self.name
    }
}
