//! SAML Status types.

use serde::{Deserialize, Serialize};

use super::status_codes;

/// SAML protocol status.
///
/// Contains the status code and optional message for a SAML response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The status code URI.
    pub status_code: String,

    /// Optional status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl Status {
    /// Creates a success status carrying the message `Success`.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status_code: status_codes::SUCCESS.to_string(),
            status_message: Some("Success".to_string()),
        }
    }

}

impl Default for Status {
    fn default() -> Self {
        Self::success()
    }
}
