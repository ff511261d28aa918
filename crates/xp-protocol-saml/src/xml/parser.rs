//! Whitespace-preserving XML parser.
//!
//! Builds an [`Element`] tree from a `quick-xml` event stream, resolving
//! namespace prefixes as it goes. Text is kept exactly as written apart from
//! the line-ending and attribute-value normalization every XML processor
//! applies, so digests computed over the tree match the signer's.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Element, Node, XmlAttribute};
use crate::error::{SamlError, SamlResult};
use crate::types::XML_NS;

/// One level of in-scope namespace declarations.
type Scope = Vec<(Option<String>, String)>;

/// Parses a document and returns its root element.
///
/// # Errors
///
/// Returns [`SamlError::XmlParse`] for malformed XML, unbound prefixes,
/// document type declarations, or content outside the root element.
pub fn parse(xml: &str) -> SamlResult<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut scopes: Vec<Scope> = Vec::new();
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root.is_some() && open.is_empty() {
                    return Err(parse_error("multiple root elements"));
                }
                let (element, scope) = start_element(&e, &scopes)?;
                scopes.push(scope);
                open.push(element);
            }
            Event::Empty(e) => {
                if root.is_some() && open.is_empty() {
                    return Err(parse_error("multiple root elements"));
                }
                let (element, _) = start_element(&e, &scopes)?;
                close(element, &mut open, &mut root);
            }
            Event::End(_) => {
                scopes.pop();
                let element = open
                    .pop()
                    .ok_or_else(|| parse_error("unexpected end tag"))?;
                close(element, &mut open, &mut root);
            }
            Event::Text(e) => {
                let raw = std::str::from_utf8(&e).map_err(|err| parse_error(err))?;
                let text = quick_xml::escape::unescape(&normalize_line_endings(raw))?.into_owned();
                push_text(&mut open, text)?;
            }
            Event::CData(e) => {
                let raw = std::str::from_utf8(&e).map_err(|err| parse_error(err))?;
                push_text(&mut open, normalize_line_endings(raw).into_owned())?;
            }
            Event::DocType(_) => {
                return Err(parse_error("document type declarations are not allowed"));
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) => {}
        }
    }

    if !open.is_empty() {
        return Err(parse_error("unclosed element at end of document"));
    }
    root.ok_or_else(|| parse_error("document has no root element"))
}

fn parse_error(message: impl ToString) -> SamlError {
    SamlError::XmlParse(message.to_string())
}

fn close(element: Element, open: &mut [Element], root: &mut Option<Element>) {
    match open.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => *root = Some(element),
    }
}

fn push_text(open: &mut [Element], text: String) -> SamlResult<()> {
    match open.last_mut() {
        Some(parent) => {
            // Adjacent text and CDATA sections form one text node.
            if let Some(Node::Text(previous)) = parent.children.last_mut() {
                previous.push_str(&text);
            } else {
                parent.children.push(Node::Text(text));
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(parse_error("text outside the root element")),
    }
}

fn start_element(e: &BytesStart<'_>, scopes: &[Scope]) -> SamlResult<(Element, Scope)> {
    let mut scope = Scope::new();
    let mut raw_attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(parse_error)?;
        let raw = std::str::from_utf8(&attr.value).map_err(parse_error)?;
        let value = normalize_attribute(raw)?;

        if key == "xmlns" {
            scope.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            if value.is_empty() {
                return Err(parse_error(format!("prefix {prefix} bound to empty namespace")));
            }
            scope.push((Some(prefix.to_string()), value));
        } else {
            raw_attributes.push((key.to_string(), value));
        }
    }

    let lookup = |prefix: Option<&str>| -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NS.to_string());
        }
        std::iter::once(&scope)
            .chain(scopes.iter().rev())
            .flat_map(|s| s.iter().rev())
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
    };

    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(parse_error)?
        .to_string();
    let (prefix, local_name) = split_name(&name);
    let namespace = match prefix {
        Some(p) => Some(
            lookup(Some(p)).ok_or_else(|| parse_error(format!("unbound namespace prefix {p}")))?,
        ),
        None => lookup(None).filter(|uri| !uri.is_empty()),
    };

    let mut attributes = Vec::with_capacity(raw_attributes.len());
    for (key, value) in raw_attributes {
        let (prefix, local_name) = split_name(&key);
        let namespace = match prefix {
            Some(p) => Some(
                lookup(Some(p))
                    .ok_or_else(|| parse_error(format!("unbound namespace prefix {p}")))?,
            ),
            None => None,
        };
        attributes.push(XmlAttribute {
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            namespace,
            value,
        });
    }

    let element = Element {
        prefix: prefix.map(str::to_string),
        local_name: local_name.to_string(),
        namespace,
        attributes,
        children: Vec::new(),
    };
    Ok((element, scope))
}

fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn normalize_line_endings(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Attribute-value normalization for CDATA-typed attributes: literal
/// whitespace characters become spaces, character references survive.
fn normalize_attribute(raw: &str) -> SamlResult<String> {
    let spaced = normalize_line_endings(raw).replace(['\t', '\n'], " ");
    Ok(quick_xml::escape::unescape(&spaced)?.into_owned())
}
