// XML namespace registry shared by request composition and response parsing.

use crate::error::SyncError;

/// Core WebDAV namespace.
pub const DAV_NS: &str = "DAV:";
/// Extension namespace used for application-defined properties.
pub const OC_NS: &str = "http://owncloud.org/ns";

/// Registry of namespace prefixes used in property XML.
///
/// Wire property names are written with these prefixes (`d:getetag`,
/// `oc:display-name`). On parse, element namespace URIs are resolved back to
/// the registered prefix regardless of what prefix the server chose.
#[derive(Debug, Clone)]
pub struct NamespaceSet {
    entries: Vec<(String, String)>,
}

impl Default for NamespaceSet {
    fn default() -> Self {
        Self {
            entries: vec![
                ("d".to_string(), DAV_NS.to_string()),
                ("oc".to_string(), OC_NS.to_string()),
            ],
        }
    }
}

impl NamespaceSet {
    pub fn register(&mut self, prefix: &str, uri: &str) -> Result<(), SyncError> {
        if self.entries.iter().any(|(p, _)| p == prefix) {
            return Err(SyncError::Config(format!(
                "duplicate namespace prefix: {}",
                prefix
            )));
        }
        self.entries.push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    /// `xmlns:` declarations for the root element of an outgoing property
    /// document, in registration order.
    pub fn xmlns_declarations(&self) -> String {
        self.entries
            .iter()
            .map(|(prefix, uri)| format!(" xmlns:{}=\"{}\"", prefix, uri))
            .collect()
    }
}
