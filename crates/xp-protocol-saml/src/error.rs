//! SAML error types.
//!
//! Every failure of the token engine is a [`SamlError`]. Callers that only
//! care about the broad outcome use [`SamlError::kind`], which sorts errors
//! into the four terminal categories of a read or write call.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// Broad classification of a [`SamlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or structurally incomplete XML.
    Parse,
    /// The signing certificate is not trusted.
    Trust,
    /// The signature does not verify.
    Integrity,
    /// No usable certificate or key for signing.
    Signing,
}

/// SAML token errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// A required element is absent.
    #[error("element {0} not found")]
    MissingElement(String),

    /// A required XML attribute is absent.
    #[error("attribute {0} not found")]
    MissingAttribute(String),

    /// A required SAML attribute value is absent from the assertion.
    #[error("SAML attribute '{0}' not found in assertion")]
    MissingClaim(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// The embedded certificate is not in the trust store.
    #[error("certificate not found in trusted store (thumbprint={0})")]
    UntrustedCertificate(String),

    /// The embedded certificate could not be decoded.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Assertion expired.
    #[error("assertion expired")]
    AssertionExpired,

    /// Assertion not yet valid.
    #[error("assertion not yet valid")]
    AssertionNotYetValid,

    /// XML signature validation failed.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// No certificate matches the requested thumbprint.
    #[error("certificate not found (thumbprint={thumbprint}, store={scope})")]
    CertificateNotFound {
        /// The requested thumbprint.
        thumbprint: String,
        /// The store scope that was searched.
        scope: String,
    },

    /// The certificate store could not be read.
    #[error("certificate store error: {0}")]
    CertificateStore(String),

    /// A value to be written contains a character XML 1.0 cannot carry.
    #[error("{field} contains a character not allowed in XML (U+{code:04X})")]
    InvalidCharacter {
        /// Which value was rejected.
        field: String,
        /// The offending code point.
        code: u32,
    },

    /// The configured signature algorithm is unknown.
    #[error("unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl SamlError {
    /// Returns the broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::XmlParse(_)
            | Self::MissingElement(_)
            | Self::MissingAttribute(_)
            | Self::MissingClaim(_)
            | Self::Base64Decode(_) => ErrorKind::Parse,
            Self::UntrustedCertificate(_)
            | Self::InvalidCertificate(_)
            | Self::AssertionExpired
            | Self::AssertionNotYetValid => ErrorKind::Trust,
            Self::SignatureInvalid(_) => ErrorKind::Integrity,
            Self::SignatureCreation(_)
            | Self::CertificateNotFound { .. }
            | Self::CertificateStore(_)
            | Self::InvalidCharacter { .. }
            | Self::UnsupportedAlgorithm(_) => ErrorKind::Signing,
        }
    }

    /// Returns true for [`ErrorKind::Parse`] errors.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse)
    }

    /// Returns true for [`ErrorKind::Trust`] errors.
    #[must_use]
    pub const fn is_trust(&self) -> bool {
        matches!(self.kind(), ErrorKind::Trust)
    }

    /// Returns true for [`ErrorKind::Integrity`] errors.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self.kind(), ErrorKind::Integrity)
    }

    /// Returns true for [`ErrorKind::Signing`] errors.
    #[must_use]
    pub const fn is_signing(&self) -> bool {
        matches!(self.kind(), ErrorKind::Signing)
    }

    /// Returns the HTTP status code a web front end should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self.kind() {
            ErrorKind::Parse => 400,
            ErrorKind::Trust | ErrorKind::Integrity => 401,
            ErrorKind::Signing => 500,
        }
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SamlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::escape::EscapeError> for SamlError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_and_statuses() {
        let err = SamlError::MissingElement("samlp:Response".to_string());
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.to_string(), "element samlp:Response not found");

        let err = SamlError::UntrustedCertificate("ABCD".to_string());
        assert!(err.is_trust());
        assert_eq!(err.http_status(), 401);

        let err = SamlError::SignatureInvalid("digest mismatch".to_string());
        assert!(err.is_integrity());

        let err = SamlError::CertificateNotFound {
            thumbprint: "ABCD".to_string(),
            scope: "local-machine/my".to_string(),
        };
        assert!(err.is_signing());
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn base64_errors_are_parse_errors() {
        use base64::Engine;
        let err: SamlError = base64::engine::general_purpose::STANDARD
            .decode("!!!")
            .unwrap_err()
            .into();
        assert!(err.is_parse());
    }
}
