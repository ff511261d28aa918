//! Exclusive XML canonicalization (without comments).
//!
//! The single rendering routine for the token engine: reference digests,
//! `SignedInfo` signatures and the serialized wire form all come from here.
//! A namespace declaration is emitted on an element only when the element
//! or one of its attributes uses the prefix and the nearest rendered
//! ancestor did not already bind it to the same URI.

use std::collections::BTreeMap;

use super::{Element, Node};
use crate::types::XML_NS;

/// Canonicalizes `element` as the apex of a document subset.
///
/// When `exclude` is given, that element (compared by identity) and its
/// subtree are left out. This implements the enveloped-signature transform.
#[must_use]
pub fn canonicalize(element: &Element, exclude: Option<&Element>) -> String {
    let mut out = String::new();
    render(element, exclude, &BTreeMap::new(), &mut out);
    out
}

fn render(
    element: &Element,
    exclude: Option<&Element>,
    rendered: &BTreeMap<String, String>,
    out: &mut String,
) {
    // Visibly utilized prefixes; "" is the default namespace.
    let mut utilized: BTreeMap<String, String> = BTreeMap::new();
    utilized.insert(
        element.prefix.clone().unwrap_or_default(),
        element.namespace.clone().unwrap_or_default(),
    );
    for attr in &element.attributes {
        if let (Some(prefix), Some(uri)) = (&attr.prefix, &attr.namespace) {
            if uri != XML_NS {
                utilized.insert(prefix.clone(), uri.clone());
            }
        }
    }

    let mut scope = rendered.clone();
    let name = qualified_name(element.prefix.as_deref(), &element.local_name);
    out.push('<');
    out.push_str(&name);

    // BTreeMap order puts the default namespace first, then prefixes.
    for (prefix, uri) in utilized {
        let current = rendered.get(&prefix).map_or("", String::as_str);
        if current == uri {
            continue;
        }
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(&prefix);
            out.push_str("=\"");
        }
        out.push_str(&escape_attr(&uri));
        out.push('"');
        scope.insert(prefix, uri);
    }

    let mut attributes: Vec<_> = element.attributes.iter().collect();
    attributes.sort_by(|a, b| {
        let a_key = (a.namespace.as_deref().unwrap_or(""), a.local_name.as_str());
        let b_key = (b.namespace.as_deref().unwrap_or(""), b.local_name.as_str());
        a_key.cmp(&b_key)
    });
    for attr in attributes {
        out.push(' ');
        out.push_str(&qualified_name(attr.prefix.as_deref(), &attr.local_name));
        out.push_str("=\"");
        out.push_str(&escape_attr(&attr.value));
        out.push('"');
    }
    out.push('>');

    for child in &element.children {
        match child {
            Node::Element(e) if exclude.is_some_and(|x| std::ptr::eq(x, e)) => {}
            Node::Element(e) => render(e, exclude, &scope, out),
            Node::Text(text) => out.push_str(&escape_text(text)),
        }
    }

    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}

fn qualified_name(prefix: Option<&str>, local_name: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local_name}"),
        None => local_name.to_string(),
    }
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}
