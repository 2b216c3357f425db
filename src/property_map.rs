// Bidirectional translation between logical attribute names and namespaced
// wire property names (e.g. `name` <-> `oc:display-name`).

use serde_json::Value;
use tracing::warn;

use crate::error::SyncError;
use crate::models::Attributes;

/// Ordered mapping from logical attribute name to namespaced wire property
/// name, built once per resource type.
///
/// Insertion order is preserved because read requests ask the server for the
/// mapped properties in exactly this order. The mapping must be invertible:
/// two logical attributes mapping to the same wire name would make response
/// parsing ambiguous, so duplicates are rejected on construction.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(String, String)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(logical, wire)` pairs, rejecting duplicate logical
    /// or wire names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, SyncError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (logical, wire) in pairs {
            map.insert(logical.into(), wire.into())?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, logical: String, wire: String) -> Result<(), SyncError> {
        if self.entries.iter().any(|(l, _)| *l == logical) {
            return Err(SyncError::Config(format!(
                "duplicate logical property name: {}",
                logical
            )));
        }
        if self.entries.iter().any(|(_, w)| *w == wire) {
            return Err(SyncError::Config(format!(
                "duplicate wire property name: {}",
                wire
            )));
        }
        self.entries.push((logical, wire));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn wire_name(&self, logical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == logical)
            .map(|(_, w)| w.as_str())
    }

    pub fn logical_name(&self, wire: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, w)| w == wire)
            .map(|(l, _)| l.as_str())
    }

    /// Wire names in insertion order; this is the property list sent on read
    /// requests.
    pub fn wire_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, w)| w.as_str())
    }

    /// Translates logical attributes into wire properties.
    ///
    /// Attributes without a mapping fall back to using the logical name as
    /// the wire name; that is deliberate legacy behavior, kept non-fatal but
    /// logged. Booleans and numbers are coerced to their string form before
    /// transmission, everything else passes through unchanged.
    pub fn to_wire(&self, attrs: &Attributes) -> Attributes {
        let mut wire = Attributes::new();
        for (logical, value) in attrs {
            let name = match self.wire_name(logical) {
                Some(name) => name.to_string(),
                None => {
                    warn!(
                        attribute = %logical,
                        "no wire property mapped for attribute, sending it under its logical name"
                    );
                    logical.clone()
                }
            };
            wire.insert(name, coerce_to_wire(value));
        }
        wire
    }

    /// Translates wire properties back into logical attributes. Unknown wire
    /// names pass through unchanged.
    pub fn to_logical(&self, wire: &Attributes) -> Attributes {
        let mut attrs = Attributes::new();
        for (name, value) in wire {
            let logical = self
                .logical_name(name)
                .map(str::to_string)
                .unwrap_or_else(|| name.clone());
            attrs.insert(logical, value.clone());
        }
        attrs
    }
}

/// Scalar coercion applied on the way out: the wire carries property values
/// as text, so booleans and numbers become their string representation.
fn coerce_to_wire(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::String(b.to_string()),
        Value::Number(n) => Value::String(n.to_string()),
        other => other.clone(),
    }
}
