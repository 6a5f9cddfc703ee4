//! XML handling for management API documents
//!
//! Response bodies are parsed into an [`xmltree::Element`] tree. Lookups are
//! namespace-aware: a `Resource` element only counts when it lives in the
//! management schema namespace, whatever prefix the document chose for it.

use std::borrow::Cow;

use ::xml::reader::{EventReader, XmlEvent};
use tracing::trace;
use xmltree::{EmitterConfig, Element, XMLNode};

use crate::error::{DevSvcError, Result};

/// Namespace of the management API schema
pub const MANAGEMENT_NAMESPACE: &str = "http://schemas.microsoft.com/windowsazure";

const RESOURCE_ELEMENT: &str = "Resource";
const NAME_ELEMENT: &str = "Name";

/// Parse a response body
///
/// An empty or whitespace-only body is "no content" and yields `None`.
/// Anything else must be a single well-formed XML document in the encoding
/// it declares.
pub fn parse_body(body: impl AsRef<[u8]>) -> Result<Option<Element>> {
    let body = body.as_ref();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    check_well_formed(body)?;
    let element = Element::parse(body)?;
    trace!("Parsed <{}> document", element.name);
    Ok(Some(element))
}

/// Read the whole document, not just up to the end of the root element
fn check_well_formed(body: &[u8]) -> Result<()> {
    let mut reader = EventReader::new(body);
    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        match reader.next()? {
            XmlEvent::StartElement { name, .. } => {
                if depth == 0 {
                    roots += 1;
                    if roots > 1 {
                        return Err(DevSvcError::MalformedResponse(format!(
                            "unexpected second root element <{}>",
                            name.local_name
                        )));
                    }
                }
                depth += 1;
            }
            XmlEvent::EndElement { .. } => depth = depth.saturating_sub(1),
            XmlEvent::Characters(_) | XmlEvent::CData(_) if depth == 0 => {
                return Err(DevSvcError::MalformedResponse(
                    "text outside the root element".to_string(),
                ));
            }
            XmlEvent::EndDocument => return Ok(()),
            _ => {}
        }
    }
}

/// Find the first `Resource` element whose `Name` child equals `name`
///
/// The document is walked in document order, root included. The comparison
/// is exact: case-sensitive and untrimmed.
pub fn find_resource<'a>(document: &'a Element, name: &str) -> Option<&'a Element> {
    if is_named_resource(document, name) {
        return Some(document);
    }
    child_elements(document).find_map(|child| find_resource(child, name))
}

/// Owned copy of the named resource, or `ResourceNotFound`
pub fn extract_resource(document: &Element, name: &str) -> Result<Element> {
    find_resource(document, name)
        .cloned()
        .ok_or_else(|| DevSvcError::ResourceNotFound {
            name: name.to_string(),
        })
}

fn is_named_resource(element: &Element, name: &str) -> bool {
    in_management_namespace(element, RESOURCE_ELEMENT)
        && child_elements(element)
            .any(|child| in_management_namespace(child, NAME_ELEMENT) && text_of(child) == name)
}

fn in_management_namespace(element: &Element, local_name: &str) -> bool {
    element.name == local_name && element.namespace.as_deref() == Some(MANAGEMENT_NAMESPACE)
}

fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

/// Concatenated character data directly under `element`
pub fn text_of(element: &Element) -> Cow<'_, str> {
    let mut texts = element.children.iter().filter_map(|node| match node {
        XMLNode::Text(text) | XMLNode::CData(text) => Some(text.as_str()),
        _ => None,
    });

    match (texts.next(), texts.next()) {
        (None, _) => Cow::Borrowed(""),
        (Some(only), None) => Cow::Borrowed(only),
        (Some(first), Some(second)) => {
            let mut joined = String::from(first);
            joined.push_str(second);
            texts.for_each(|t| joined.push_str(t));
            Cow::Owned(joined)
        }
    }
}

/// Serialize an element as indented XML without a declaration
pub fn to_pretty_string(element: &Element) -> Result<String> {
    let config = EmitterConfig::new()
        .perform_indent(true)
        .write_document_declaration(false);

    let mut buf = Vec::new();
    element
        .write_with_config(&mut buf, config)
        .map_err(|e| DevSvcError::Render(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| DevSvcError::Render(e.to_string()))
}

/// The URL-encoded URI carried by an SSO token response
///
/// This is the text of the first leaf element, in document order, whose
/// text is not blank.
pub fn sso_uri(document: &Element) -> Option<String> {
    let has_children = child_elements(document).next().is_some();
    if !has_children {
        let text = text_of(document);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    child_elements(document).find_map(sso_uri)
}

/// Percent-decode an SSO URI
pub fn decode_sso_uri(encoded: &str) -> Result<String> {
    Ok(urlencoding::decode(encoded)?.into_owned())
}
