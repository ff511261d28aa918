//! SAML Assertion types.
//!
//! Assertions contain statements about a subject made by an issuer. The
//! engine only ever builds one shape: a sender-vouches subject, a short
//! validity window and a single attribute statement.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{attribute_name_formats, confirmation_methods, NameId};
use crate::error::{SamlError, SamlResult};
use crate::xml;

/// Clock skew tolerated before the issue instant.
pub const NOT_BEFORE_SKEW_MINUTES: i64 = 2;

/// Lifetime of an assertion after its issue instant.
pub const VALIDITY_MINUTES: i64 = 5;

/// SAML Assertion.
///
/// A package of information that supplies one or more statements made
/// by a SAML authority (the issuer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assertion {
    /// Unique identifier for this assertion.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this assertion was issued.
    pub issue_instant: DateTime<Utc>,

    /// The issuer of this assertion.
    pub issuer: NameId,

    /// The subject of this assertion.
    pub subject: Subject,

    /// Conditions that must be evaluated for the assertion to be valid.
    pub conditions: Conditions,

    /// Attribute statement containing attributes about the subject.
    pub attribute_statement: AttributeStatement,
}

fn default_version() -> String {
    "2.0".to_string()
}

impl Assertion {
    /// Generates a fresh assertion identifier.
    #[must_use]
    pub fn generate_id() -> String {
        format!("SamlAssertion-{}", uuid::Uuid::new_v4().simple())
    }

    /// Checks that every written value is representable in XML.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidCharacter`] naming the first offending
    /// value.
    pub fn check_characters(&self) -> SamlResult<()> {
        check_text("issuer", &self.issuer.value)?;
        check_text("subject", &self.subject.name_id.value)?;
        for attribute in &self.attribute_statement.attributes {
            check_text("attribute name", &attribute.name)?;
            check_text(&format!("attribute '{}'", attribute.name), &attribute.value)?;
        }
        Ok(())
    }

    /// Returns the value of the named attribute, if present.
    #[must_use]
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute_statement
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

fn check_text(field: &str, value: &str) -> SamlResult<()> {
    match value.chars().find(|c| !xml::is_xml_char(*c)) {
        Some(c) => Err(SamlError::InvalidCharacter {
            field: field.to_string(),
            code: u32::from(c),
        }),
        None => Ok(()),
    }
}

/// Subject of an assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// The name identifier for the subject.
    pub name_id: NameId,

    /// How the relying party confirms the subject.
    pub confirmation: SubjectConfirmation,
}

impl Subject {
    /// Creates a sender-vouches subject with an unspecified-format name ID.
    #[must_use]
    pub fn sender_vouches(name: impl Into<String>) -> Self {
        Self {
            name_id: NameId::unspecified(name),
            confirmation: SubjectConfirmation::sender_vouches(),
        }
    }
}

/// Subject confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfirmation {
    /// The confirmation method.
    pub method: String,
}

impl SubjectConfirmation {
    /// Creates a sender-vouches confirmation.
    #[must_use]
    pub fn sender_vouches() -> Self {
        Self {
            method: confirmation_methods::SENDER_VOUCHES.to_string(),
        }
    }
}

/// Conditions for assertion validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    pub not_before: DateTime<Utc>,

    /// Time at or after which the assertion is not valid.
    pub not_on_or_after: DateTime<Utc>,
}

impl Conditions {
    /// Creates the standard window around `now`.
    #[must_use]
    pub fn around(now: DateTime<Utc>) -> Self {
        Self {
            not_before: now - Duration::minutes(NOT_BEFORE_SKEW_MINUTES),
            not_on_or_after: now + Duration::minutes(VALIDITY_MINUTES),
        }
    }

    /// Checks `now` against the window.
    ///
    /// # Errors
    ///
    /// [`SamlError::AssertionNotYetValid`] before `not_before`,
    /// [`SamlError::AssertionExpired`] at or after `not_on_or_after`.
    pub fn check(&self, now: DateTime<Utc>) -> SamlResult<()> {
        if now < self.not_before {
            return Err(SamlError::AssertionNotYetValid);
        }
        if now >= self.not_on_or_after {
            return Err(SamlError::AssertionExpired);
        }
        Ok(())
    }

    /// Returns true if `now` lies inside the window.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.check(now).is_ok()
    }
}

/// Attribute statement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// The attributes in this statement.
    pub attributes: Vec<Attribute>,
}

/// A SAML attribute carrying a single value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// The attribute name.
    pub name: String,

    /// The attribute name format.
    pub name_format: String,

    /// The attribute value.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute with the unspecified name format.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            name_format: attribute_name_formats::UNSPECIFIED.to_string(),
            value: value.into(),
        }
    }
}

/// Builder for [`Assertion`].
#[derive(Debug, Clone)]
pub struct AssertionBuilder {
    issuer: String,
    subject: String,
    attributes: BTreeMap<String, String>,
}

impl AssertionBuilder {
    /// Creates a builder for the given issuer and subject.
    #[must_use]
    pub fn new(issuer: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            subject: subject.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Adds an attribute. A later value for the same name replaces an
    /// earlier one.
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Adds every attribute of a mapping.
    #[must_use]
    pub fn attributes<I, K, V>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in attributes {
            self.attributes.insert(name.into(), value.into());
        }
        self
    }

    /// Builds the assertion using the current time.
    #[must_use]
    pub fn build(self) -> Assertion {
        self.build_at(Utc::now())
    }

    /// Builds the assertion as if issued at `now`.
    ///
    /// Attributes with empty values are dropped.
    #[must_use]
    pub fn build_at(self, now: DateTime<Utc>) -> Assertion {
        let attributes = self
            .attributes
            .into_iter()
            .filter(|(name, value)| !name.is_empty() && !value.is_empty())
            .map(|(name, value)| Attribute::new(name, value))
            .collect();

        Assertion {
            id: Assertion::generate_id(),
            version: default_version(),
            issue_instant: now,
            issuer: NameId::unspecified(self.issuer),
            subject: Subject::sender_vouches(self.subject),
            conditions: Conditions::around(now),
            attribute_statement: AttributeStatement { attributes },
        }
    }
}
