// Parser for WebDAV multi-status (207) responses: turns the raw XML into an
// ordered list of logical records with derived identifiers.

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use serde_json::Value;

use crate::error::SyncError;
use crate::models::{Attributes, Depth, ResponseRecord};
use crate::namespaces::NamespaceSet;
use crate::property_map::PropertyMap;

/// Parses a multi-status document into logical records, in server order.
///
/// Per response entry, only property groups whose `<d:status>` line carries a
/// 2xx code contribute attributes; failed groups are silently omitted. If no
/// logical `id` attribute exists after translation, the id is derived from
/// the entry's href. Listings requested with a depth greater than 0 have the
/// container itself as their first entry, which is dropped from the result.
pub fn parse_multistatus(
    xml: &str,
    map: &PropertyMap,
    namespaces: &NamespaceSet,
    depth: Depth,
) -> Result<Vec<ResponseRecord>, SyncError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut records: Vec<ResponseRecord> = Vec::new();

    // Per-response accumulation
    let mut href = String::new();
    let mut wire_props = Attributes::new();
    let mut in_response = false;

    // Per-propstat accumulation; merged into `wire_props` only when the
    // group's status line reports success.
    let mut group_props = Attributes::new();
    let mut group_status: Option<String> = None;
    let mut in_propstat = false;
    let mut in_prop = false;

    // Current property element inside <d:prop>; nested markup below it is
    // flattened into its text value.
    let mut capture: Option<(String, String)> = None;
    let mut capture_depth = 0usize;

    let mut in_href = false;
    let mut in_status = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_resolved_event_into(&mut buf)? {
            (resolve, Event::Start(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if capture.is_some() {
                    capture_depth += 1;
                } else if in_prop {
                    capture = Some((wire_property_name(&resolve, &local, namespaces), String::new()));
                    capture_depth = 1;
                } else {
                    match local.as_str() {
                        "response" => {
                            in_response = true;
                            href.clear();
                            wire_props = Attributes::new();
                        }
                        "propstat" if in_response => {
                            in_propstat = true;
                            group_props = Attributes::new();
                            group_status = None;
                        }
                        "prop" if in_propstat => in_prop = true,
                        "href" if in_response => in_href = true,
                        "status" if in_propstat => in_status = true,
                        _ => {}
                    }
                }
            }
            (resolve, Event::Empty(ref e)) => {
                if in_prop && capture.is_none() {
                    let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    let name = wire_property_name(&resolve, &local, namespaces);
                    group_props.insert(name, Value::String(String::new()));
                }
            }
            (_, Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some((_, ref mut value)) = capture {
                    value.push_str(&text);
                } else if in_href {
                    href.push_str(&text);
                } else if in_status {
                    group_status = Some(text);
                }
            }
            (_, Event::End(ref e)) => {
                if capture.is_some() {
                    capture_depth -= 1;
                    if capture_depth == 0 {
                        let (name, value) = capture.take().unwrap();
                        group_props.insert(name, Value::String(value));
                    }
                    buf.clear();
                    continue;
                }
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match local.as_str() {
                    "response" => {
                        records.push(finish_record(std::mem::take(&mut href), &wire_props, map));
                        in_response = false;
                    }
                    "propstat" => {
                        if group_status.as_deref().map(status_is_success).unwrap_or(false) {
                            wire_props.append(&mut group_props);
                        }
                        in_propstat = false;
                    }
                    "prop" => in_prop = false,
                    "href" => in_href = false,
                    "status" => in_status = false,
                    _ => {}
                }
            }
            (_, Event::Eof) => break,
            _ => {}
        }
        buf.clear();
    }

    // The first entry of a depth>0 listing is the container itself, not a
    // child record.
    if depth.includes_children() && !records.is_empty() {
        records.remove(0);
    }
    Ok(records)
}

/// Resolves an element back to its wire property name (`oc:display-name`)
/// using the registered prefixes; elements in unregistered namespaces keep
/// their bare local name.
fn wire_property_name(resolve: &ResolveResult, local: &str, namespaces: &NamespaceSet) -> String {
    if let ResolveResult::Bound(ns) = resolve {
        let uri = String::from_utf8_lossy(ns.0);
        if let Some(prefix) = namespaces.prefix_for(&uri) {
            return format!("{}:{}", prefix, local);
        }
    }
    local.to_string()
}

/// `"HTTP/1.1 200 OK"` style status line check; anything outside 2xx means
/// the property group did not apply.
fn status_is_success(status_line: &str) -> bool {
    status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .map(|code| (200..300).contains(&code))
        .unwrap_or(false)
}

fn finish_record(href: String, wire_props: &Attributes, map: &PropertyMap) -> ResponseRecord {
    let attributes = map.to_logical(wire_props);
    let id = attributes
        .get("id")
        .and_then(attribute_id)
        .or_else(|| parse_id_from_href(&href))
        .unwrap_or_default();
    ResponseRecord {
        href,
        id,
        attributes,
    }
}

fn attribute_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Derives an identifier from an href or location URL: the last non-empty
/// path segment, with any query string stripped. Trailing slashes produce
/// empty segments which are skipped from the end; the result is never the
/// empty string.
pub fn parse_id_from_href(href: &str) -> Option<String> {
    let path = href.split('?').next().unwrap_or(href);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tag_map() -> PropertyMap {
        PropertyMap::from_pairs([
            ("id", "oc:id"),
            ("name", "oc:display-name"),
            ("userVisible", "oc:user-visible"),
        ])
        .expect("valid map")
    }

    fn namespaces() -> NamespaceSet {
        NamespaceSet::default()
    }

    #[test]
    fn test_parse_id_from_href_with_trailing_slash() {
        assert_eq!(parse_id_from_href("/dav/files/u/42/"), Some("42".to_string()));
    }

    #[test]
    fn test_parse_id_from_href_strips_query() {
        assert_eq!(
            parse_id_from_href("/dav/files/u/42?x=1"),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_parse_id_from_href_skips_trailing_empty_segments() {
        assert_eq!(parse_id_from_href("/dav/files/u/"), Some("u".to_string()));
        assert_eq!(parse_id_from_href("/dav/files/u//"), Some("u".to_string()));
    }

    #[test]
    fn test_parse_id_from_href_never_empty() {
        assert_eq!(parse_id_from_href("/"), None);
        assert_eq!(parse_id_from_href(""), None);
    }

    #[test]
    fn test_single_resource_parse() {
        let xml = r#"<?xml version="1.0"?>
            <d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
                <d:response>
                    <d:href>/remote.php/dav/systemtags/7</d:href>
                    <d:propstat>
                        <d:prop>
                            <oc:display-name>Important</oc:display-name>
                            <oc:user-visible>true</oc:user-visible>
                        </d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
            </d:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::Zero)
            .expect("parse should succeed");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.href, "/remote.php/dav/systemtags/7");
        // No mapped id property in the body, so the id comes from the href.
        assert_eq!(record.id, "7");
        assert_eq!(record.attributes.get("name"), Some(&json!("Important")));
        assert_eq!(record.attributes.get("userVisible"), Some(&json!("true")));
    }

    #[test]
    fn test_mapped_id_attribute_wins_over_href_derivation() {
        let xml = r#"<?xml version="1.0"?>
            <d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
                <d:response>
                    <d:href>/remote.php/dav/systemtags/7</d:href>
                    <d:propstat>
                        <d:prop><oc:id>99</oc:id></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
            </d:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::Zero)
            .expect("parse should succeed");
        assert_eq!(records[0].id, "99");
    }

    #[test]
    fn test_depth_one_listing_drops_container_entry() {
        let xml = r#"<?xml version="1.0"?>
            <d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
                <d:response>
                    <d:href>/remote.php/dav/systemtags/</d:href>
                    <d:propstat>
                        <d:prop><oc:display-name>root</oc:display-name></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
                <d:response>
                    <d:href>/remote.php/dav/systemtags/1</d:href>
                    <d:propstat>
                        <d:prop><oc:display-name>first</oc:display-name></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
                <d:response>
                    <d:href>/remote.php/dav/systemtags/2</d:href>
                    <d:propstat>
                        <d:prop><oc:display-name>second</oc:display-name></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
            </d:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::One)
            .expect("parse should succeed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].attributes.get("name"), Some(&json!("first")));
        assert_eq!(records[1].id, "2");
        assert!(records.iter().all(|r| r.href != "/remote.php/dav/systemtags/"));
    }

    #[test]
    fn test_failed_propstat_group_is_excluded() {
        let xml = r#"<?xml version="1.0"?>
            <d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
                <d:response>
                    <d:href>/remote.php/dav/systemtags/3</d:href>
                    <d:propstat>
                        <d:prop><oc:display-name>kept</oc:display-name></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                    <d:propstat>
                        <d:prop><oc:user-visible/></d:prop>
                        <d:status>HTTP/1.1 404 Not Found</d:status>
                    </d:propstat>
                </d:response>
            </d:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::Zero)
            .expect("parse should succeed");
        let record = &records[0];
        assert_eq!(record.attributes.get("name"), Some(&json!("kept")));
        assert!(!record.attributes.contains_key("userVisible"));
    }

    #[test]
    fn test_server_prefix_choice_does_not_matter() {
        // Same DAV: and extension namespaces bound to different prefixes.
        let xml = r#"<?xml version="1.0"?>
            <D:multistatus xmlns:D="DAV:" xmlns:x="http://owncloud.org/ns">
                <D:response>
                    <D:href>/dav/tags/5</D:href>
                    <D:propstat>
                        <D:prop><x:display-name>renamed</x:display-name></D:prop>
                        <D:status>HTTP/1.1 200 OK</D:status>
                    </D:propstat>
                </D:response>
            </D:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::Zero)
            .expect("parse should succeed");
        assert_eq!(records[0].attributes.get("name"), Some(&json!("renamed")));
    }

    #[test]
    fn test_unmapped_property_kept_under_wire_name() {
        let xml = r#"<?xml version="1.0"?>
            <d:multistatus xmlns:d="DAV:" xmlns:oc="http://owncloud.org/ns">
                <d:response>
                    <d:href>/dav/tags/5</d:href>
                    <d:propstat>
                        <d:prop><d:getetag>"abc"</d:getetag></d:prop>
                        <d:status>HTTP/1.1 200 OK</d:status>
                    </d:propstat>
                </d:response>
            </d:multistatus>"#;

        let records = parse_multistatus(xml, &tag_map(), &namespaces(), Depth::Zero)
            .expect("parse should succeed");
        assert_eq!(
            records[0].attributes.get("d:getetag"),
            Some(&json!("\"abc\""))
        );
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = parse_multistatus("<d:multistatus", &tag_map(), &namespaces(), Depth::Zero);
        assert!(result.is_err());
    }
}
