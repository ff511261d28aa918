//! Namespace-resolved XML tree.
//!
//! Documents are parsed into a small owned tree where every element and
//! attribute carries its resolved namespace URI. Namespace declarations are
//! not stored: the canonicalizer derives them from the resolved names, which
//! keeps signing, serialization and verification on one rendering path.

pub mod c14n;
pub mod parser;

pub use c14n::canonicalize;
pub use parser::parse;

use crate::error::{SamlError, SamlResult};
use crate::types::{SAMLP_NS, SAML_NS, XMLDSIG_NS};

/// A child node of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data, already unescaped.
    Text(String),
}

/// An attribute with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Prefix as written, if any.
    pub prefix: Option<String>,
    /// Local name.
    pub local_name: String,
    /// Namespace URI; unprefixed attributes have none.
    pub namespace: Option<String>,
    /// Unescaped, normalized value.
    pub value: String,
}

/// An XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Prefix as written, if any.
    pub prefix: Option<String>,
    /// Local name.
    pub local_name: String,
    /// Resolved namespace URI.
    pub namespace: Option<String>,
    /// Attributes in document order.
    pub attributes: Vec<XmlAttribute>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element in a namespace, written with `prefix`.
    #[must_use]
    pub fn qualified(prefix: &str, namespace: &str, local_name: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            local_name: local_name.to_string(),
            namespace: Some(namespace.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an unqualified attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            prefix: None,
            local_name: name.to_string(),
            namespace: None,
            value: value.into(),
        });
        self
    }

    /// Appends a text node.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Returns true if the element has the given namespace and local name.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(namespace)
    }

    /// Returns the value of an unqualified attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.local_name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns an unqualified attribute or a [`SamlError::MissingAttribute`].
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute is absent.
    pub fn required_attribute(&self, name: &str) -> SamlResult<&str> {
        self.attribute(name)
            .ok_or_else(|| SamlError::MissingAttribute(format!("{}@{name}", self.display_name())))
    }

    /// Concatenated text of the direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Iterates over child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Returns the first child element with the given name.
    #[must_use]
    pub fn find_child(&self, namespace: &str, local_name: &str) -> Option<&Self> {
        self.child_elements().find(|e| e.is(namespace, local_name))
    }

    /// Index in `children` of the first child element with the given name.
    #[must_use]
    pub fn child_position(&self, namespace: &str, local_name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(namespace, local_name)))
    }

    /// Follows a path of `(namespace, local name)` steps through child
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingElement`] naming the first step that has
    /// no match.
    pub fn select_required(&self, path: &[(&str, &str)]) -> SamlResult<&Self> {
        let mut current = self;
        for (namespace, local_name) in path {
            current = current
                .find_child(namespace, local_name)
                .ok_or_else(|| SamlError::MissingElement(display_name(namespace, local_name)))?;
        }
        Ok(current)
    }

    /// Name used in error messages, with the conventional prefix.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(self.namespace.as_deref().unwrap_or(""), &self.local_name)
    }
}

/// Returns true if `c` may appear in an XML 1.0 document.
#[must_use]
pub const fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

fn display_name(namespace: &str, local_name: &str) -> String {
    let prefix = match namespace {
        SAMLP_NS => "samlp",
        SAML_NS => "saml",
        XMLDSIG_NS => "ds",
        _ => return local_name.to_string(),
    };
    format!("{prefix}:{local_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::qualified("samlp", SAMLP_NS, "Response")
            .with_attribute("ID", "_id1")
            .with_child(Element::qualified("saml", SAML_NS, "Issuer").with_text("Carrier"))
            .with_child(
                Element::qualified("samlp", SAMLP_NS, "Status").with_child(
                    Element::qualified("samlp", SAMLP_NS, "StatusMessage").with_text("Success"),
                ),
            )
    }

    #[test]
    fn select_required_follows_path() {
        let root = sample();
        let message = root
            .select_required(&[(SAMLP_NS, "Status"), (SAMLP_NS, "StatusMessage")])
            .unwrap();
        assert_eq!(message.text(), "Success");
    }

    #[test]
    fn select_required_names_missing_step() {
        let root = sample();
        let err = root
            .select_required(&[(XMLDSIG_NS, "Signature"), (XMLDSIG_NS, "KeyInfo")])
            .unwrap_err();
        assert_eq!(err.to_string(), "element ds:Signature not found");
        assert!(err.is_parse());
    }

    #[test]
    fn namespace_is_part_of_identity() {
        let root = sample();
        assert!(root.find_child(SAML_NS, "Issuer").is_some());
        assert!(root.find_child(SAMLP_NS, "Issuer").is_none());
        assert_eq!(root.child_position(SAMLP_NS, "Status"), Some(1));
    }

    #[test]
    fn xml_char_ranges() {
        for c in ['\t', '\n', '\r', ' ', 'é', '\u{E000}', '\u{10FFFF}'] {
            assert!(is_xml_char(c), "{c:?}");
        }
        for c in ['\u{0}', '\u{1}', '\u{1F}', '\u{FFFE}', '\u{FFFF}'] {
            assert!(!is_xml_char(c), "{c:?}");
        }
    }

    #[test]
    fn attributes() {
        let root = sample();
        assert_eq!(root.attribute("ID"), Some("_id1"));
        assert_eq!(
            root.required_attribute("Version").unwrap_err().to_string(),
            "attribute samlp:Response@Version not found"
        );
    }
}
