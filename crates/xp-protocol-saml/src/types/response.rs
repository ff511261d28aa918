//! SAML Response types.
//!
//! The response is the protocol envelope around a single signed assertion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Assertion, Status};
use crate::xml::Element;

/// SAML Response.
///
/// The assertion is held in its signed XML form, since its signature covers
/// the exact element tree and must travel unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier for this response.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The issuer of this response.
    pub issuer: String,

    /// The status of the response.
    pub status: Status,

    /// The embedded assertion element.
    #[serde(skip)]
    pub assertion: Element,

    /// ID of the embedded assertion.
    pub assertion_id: String,
}

fn default_version() -> String {
    "2.0".to_string()
}

/// Builder for [`Response`].
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    issuer: String,
    status: Status,
    issue_instant: Option<DateTime<Utc>>,
}

impl ResponseBuilder {
    /// Creates a builder for a successful response from `issuer`.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            status: Status::success(),
            issue_instant: None,
        }
    }

    /// Sets the issue instant (defaults to now).
    #[must_use]
    pub const fn issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.issue_instant = Some(instant);
        self
    }

    /// Wraps an assertion and its signed element into a response.
    #[must_use]
    pub fn build(self, assertion: &Assertion, signed_assertion: Element) -> Response {
        Response {
            id: format!("_id{}", uuid::Uuid::new_v4()),
            version: default_version(),
            issue_instant: self.issue_instant.unwrap_or(assertion.issue_instant),
            issuer: self.issuer,
            status: self.status,
            assertion: signed_assertion,
            assertion_id: assertion.id.clone(),
        }
    }
}
