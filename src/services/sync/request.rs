// Builds the concrete physical request for each verb: method, url, headers,
// depth and the property XML or JSON body.

use quick_xml::escape::escape;
use serde_json::Value;

use super::verbs::Verb;
use crate::models::{Attributes, Depth};
use crate::namespaces::NamespaceSet;
use crate::property_map::PropertyMap;

/// A fully composed request, ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub verb: Verb,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Only meaningful for read verbs.
    pub depth: Option<Depth>,
    pub body: Option<String>,
}

/// Composes one physical request.
///
/// `attrs` is the attribute set relevant to the verb: the changed subset for
/// a property patch, the full set for create/replace; ignored for the
/// body-less verbs. Read requests ask for exactly the properties the map
/// knows about, nothing more.
pub fn compose(
    verb: Verb,
    url: &str,
    attrs: &Attributes,
    map: &PropertyMap,
    namespaces: &NamespaceSet,
    headers: &[(String, String)],
    depth: Option<Depth>,
) -> RequestDescriptor {
    let mut headers = headers.to_vec();
    let mut body = None;
    let mut request_depth = None;

    match verb {
        Verb::Propfind => {
            set_header(&mut headers, "Content-Type", "application/xml");
            body = Some(propfind_body(map, namespaces));
            request_depth = depth;
        }
        Verb::Proppatch => {
            set_header(&mut headers, "Content-Type", "application/xml");
            body = Some(proppatch_body(&map.to_wire(attrs), namespaces));
        }
        Verb::Post | Verb::Put => {
            // Full replacement payloads go out in the caller's own
            // representation.
            set_header(&mut headers, "Content-Type", "application/json");
            body = Some(Value::Object(attrs.clone()).to_string());
        }
        Verb::Mkcol | Verb::Delete => {}
    }

    RequestDescriptor {
        verb,
        url: url.to_string(),
        headers,
        depth: request_depth,
        body,
    }
}

/// Merges `extra` over `base`; on a name collision (case-insensitive) the
/// later entry replaces the earlier one.
pub fn merge_headers(
    base: &[(String, String)],
    extra: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = base.to_vec();
    for (name, value) in extra {
        set_header(&mut merged, name, value);
    }
    merged
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    if let Some(entry) = headers
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        entry.1 = value.to_string();
    } else {
        headers.push((name.to_string(), value.to_string()));
    }
}

fn propfind_body(map: &PropertyMap, namespaces: &NamespaceSet) -> String {
    let props: String = map
        .wire_names()
        .map(|name| format!("<{}/>", name))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<d:propfind{}><d:prop>{}</d:prop></d:propfind>",
        namespaces.xmlns_declarations(),
        props
    )
}

fn proppatch_body(wire_props: &Attributes, namespaces: &NamespaceSet) -> String {
    let props: String = wire_props
        .iter()
        .map(|(name, value)| {
            format!("<{}>{}</{}>", name, escape(&wire_value_text(value)), name)
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<d:propertyupdate{}><d:set><d:prop>{}</d:prop></d:set></d:propertyupdate>",
        namespaces.xmlns_declarations(),
        props
    )
}

fn wire_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
