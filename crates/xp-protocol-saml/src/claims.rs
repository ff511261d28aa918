//! Claim profiles.
//!
//! A profile lists the SAML attributes a reader requires and the result key
//! each one is returned under.

use std::collections::BTreeMap;

use crate::error::{SamlError, SamlResult};
use crate::types::SAML_NS;
use crate::xml::Element;

/// Claims extracted from a verified token, keyed by result key.
pub type ExtractedClaims = BTreeMap<String, String>;

/// Attribute names exchanged between the portals.
pub mod attribute_names {
    /// Payment transaction identifier.
    pub const PAYMENT_TRANSACTION_ID: &str = "Payment Transaction ID";
    /// Amount paid.
    pub const TOTAL_AMOUNT_PAID: &str = "Total Amount Paid";
    /// Payment outcome.
    pub const PAYMENT_STATUS: &str = "Payment Status";
    /// Enrollee first name.
    pub const FIRST_NAME: &str = "First Name";
    /// Enrollee middle name.
    pub const MIDDLE_NAME: &str = "Middle Name";
    /// Enrollee last name.
    pub const LAST_NAME: &str = "Last Name";
    /// First street line.
    pub const STREET_NAME_1: &str = "Street Name 1";
    /// Second street line.
    pub const STREET_NAME_2: &str = "Street Name 2";
    /// City.
    pub const CITY: &str = "City";
    /// State.
    pub const STATE: &str = "State";
    /// Zip code.
    pub const ZIP_CODE: &str = "Zip Code";
    /// Contact email.
    pub const CONTACT_EMAIL: &str = "Contact Email Address";
    /// Premium owed.
    pub const TOTAL_AMOUNT_OWED: &str = "Total Amount Owed";
    /// Where the carrier sends the user back to.
    pub const RETURN_URL: &str = "Return URL";
}

/// Ordered mapping from SAML attribute name to result key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimProfile {
    claims: Vec<(String, String)>,
}

impl ClaimProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a profile from `(attribute name, result key)` pairs.
    #[must_use]
    pub fn custom<I, A, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, K)>,
        A: Into<String>,
        K: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |profile, (attribute, key)| profile.claim(attribute, key))
    }

    /// Payment result sent by the carrier back to the exchange.
    #[must_use]
    pub fn payment() -> Self {
        use attribute_names::*;
        Self::custom([
            (PAYMENT_TRANSACTION_ID, "paymentTransactionID"),
            (TOTAL_AMOUNT_PAID, "totalAmountPaid"),
            (PAYMENT_STATUS, "paymentStatus"),
        ])
    }

    /// Enrollment details sent by the exchange to the carrier.
    #[must_use]
    pub fn carrier_enrollment() -> Self {
        use attribute_names::*;
        Self::custom([
            (FIRST_NAME, "firstName"),
            (MIDDLE_NAME, "middleName"),
            (LAST_NAME, "lastName"),
            (STREET_NAME_1, "address1"),
            (STREET_NAME_2, "address2"),
            (CITY, "city"),
            (STATE, "state"),
            (ZIP_CODE, "zip"),
            (CONTACT_EMAIL, "email"),
            (TOTAL_AMOUNT_OWED, "amountOwed"),
            (RETURN_URL, "redirectUrl"),
        ])
    }

    /// Looks up a built-in profile by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "payment" => Some(Self::payment()),
            "enrollment" | "carrier-enrollment" => Some(Self::carrier_enrollment()),
            _ => None,
        }
    }

    /// Adds a required attribute. A repeated attribute name replaces the
    /// earlier key.
    #[must_use]
    pub fn claim(mut self, attribute: impl Into<String>, key: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let key = key.into();
        match self.claims.iter_mut().find(|(a, _)| *a == attribute) {
            Some(existing) => existing.1 = key,
            None => self.claims.push((attribute, key)),
        }
        self
    }

    /// Iterates over `(attribute name, result key)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.claims.iter().map(|(a, k)| (a.as_str(), k.as_str()))
    }

    /// Number of required attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Returns true if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Extracts every required attribute from an assertion element.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::MissingClaim`] for the first required attribute
    /// that has no value.
    pub fn extract(&self, assertion: &Element) -> SamlResult<ExtractedClaims> {
        self.iter()
            .map(|(attribute, key)| {
                attribute_value(assertion, attribute)
                    .map(|value| (key.to_string(), value))
                    .ok_or_else(|| SamlError::MissingClaim(attribute.to_string()))
            })
            .collect()
    }
}

/// Text of the first `saml:AttributeValue` of the named attribute.
fn attribute_value(assertion: &Element, name: &str) -> Option<String> {
    assertion
        .child_elements()
        .filter(|e| e.is(SAML_NS, "AttributeStatement"))
        .flat_map(|statement| statement.child_elements())
        .filter(|e| e.is(SAML_NS, "Attribute") && e.attribute("Name") == Some(name))
        .find_map(|attribute| attribute.find_child(SAML_NS, "AttributeValue"))
        .map(Element::text)
}
