// Core data model for the sync adapter: abstract operations, resource
// descriptors and the records produced by multi-status parsing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::property_map::PropertyMap;

/// Logical attribute set of a model, keyed by logical attribute name.
pub type Attributes = Map<String, Value>;

/// Abstract persistence operation supplied by the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operation {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "patch")]
    Patch,
    #[serde(rename = "delete")]
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Patch => write!(f, "patch"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// How a resource behaves on write.
///
/// `Container` marks a resource that is itself created as a collection, which
/// forces the two-step MKCOL + PROPPATCH path on update. `ReplaceOnly` marks a
/// resource whose server endpoint only accepts full-body replacement (PUT)
/// instead of property patches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceKind {
    #[default]
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "container")]
    Container,
    #[serde(rename = "replace_only")]
    ReplaceOnly,
}

/// Addressing and shape of a synced resource.
#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// Resolved endpoint URL. `None` makes any sync fail before the network.
    pub url: Option<String>,
    pub kind: ResourceKind,
    /// Collections are read with depth 1 by default, single records with 0.
    pub is_collection: bool,
}

/// A model as handed over by the persistence layer: its resource descriptor,
/// its full attribute set, the attributes changed since the last sync and the
/// property map for its resource type.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub resource: Resource,
    pub attributes: Attributes,
    pub changed: Attributes,
    pub properties: PropertyMap,
}

impl Model {
    pub fn new(resource: Resource, properties: PropertyMap) -> Self {
        Self {
            resource,
            properties,
            ..Default::default()
        }
    }
}

/// WebDAV Depth header value for read verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}

impl Depth {
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }

    /// Whether a listing at this depth carries the container itself as its
    /// first entry.
    pub fn includes_children(self) -> bool {
        !matches!(self, Depth::Zero)
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical record parsed out of a multi-status response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseRecord {
    pub href: String,
    /// Taken from a mapped attribute literally named `id`, otherwise derived
    /// from the last non-empty path segment of `href`.
    pub id: String,
    pub attributes: Attributes,
}

/// Normalized success payload of a sync call.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Single-resource read.
    Record(ResponseRecord),
    /// Collection read, or a write whose response carried a multi-status body.
    Records(Vec<ResponseRecord>),
    /// Write operations where the protocol does not echo new state: the
    /// caller's own representation, with the id overridden from the response
    /// location header on create.
    Echo(Attributes),
}
