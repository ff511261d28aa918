//! SAML Name ID types.
//!
//! Name identifiers name both the issuer and the subject of an assertion.

use serde::{Deserialize, Serialize};

use super::NameIdFormat;

/// SAML Name ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// The actual identifier value.
    pub value: String,

    /// The format of the name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl NameId {
    /// Creates a new name ID with no format.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
        }
    }

    /// Creates a name ID with the unspecified format.
    #[must_use]
    pub fn unspecified(value: impl Into<String>) -> Self {
        Self::new(value).with_format(NameIdFormat::Unspecified)
    }

    /// Sets the format.
    #[must_use]
    pub fn with_format(mut self, format: NameIdFormat) -> Self {
        self.format = Some(format.uri().to_string());
        self
    }
}
