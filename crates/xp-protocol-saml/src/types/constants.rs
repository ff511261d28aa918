//! SAML 2.0 constants and URIs.
//!
//! Namespace URIs, name ID formats, status codes and the XML signature
//! algorithm identifiers used by the token engine.

/// SAML 2.0 assertion namespace URI.
pub const SAML_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace URI.
pub const SAMLP_NS: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// XML Digital Signature namespace URI.
pub const XMLDSIG_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Reserved `xml` prefix namespace URI.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Prefix written for the assertion namespace.
pub const SAML_PREFIX: &str = "saml";

/// Prefix written for the protocol namespace.
pub const SAMLP_PREFIX: &str = "samlp";

/// Prefix written for the signature namespace.
pub const DS_PREFIX: &str = "ds";

// ============================================================================
// Name ID Formats
// ============================================================================

/// SAML Name ID formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameIdFormat {
    /// Unspecified name ID format.
    #[default]
    Unspecified,
}

impl NameIdFormat {
    /// Returns the URI for this name ID format.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Unspecified => "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified",
        }
    }
}

// ============================================================================
// Attribute Name Formats
// ============================================================================

/// Attribute name format URIs.
pub mod attribute_name_formats {
    /// Unspecified attribute name format (the default).
    pub const UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:2.0:attrname-format:unspecified";
}

// ============================================================================
// Subject Confirmation Methods
// ============================================================================

/// Subject confirmation method URIs.
pub mod confirmation_methods {
    /// Sender vouches: trust in the subject rests on trust in the signer.
    pub const SENDER_VOUCHES: &str = "urn:oasis:names:tc:SAML:2.0:cm:sender-vouches";
}

// ============================================================================
// Status Codes
// ============================================================================

/// SAML status code URIs.
pub mod status_codes {
    /// Success status.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
}

// ============================================================================
// XML Signature Algorithms
// ============================================================================

/// Signature method URIs.
pub mod signature_algorithms {
    /// RSA with SHA-1 (legacy).
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";

    /// RSA with SHA-256.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

    /// RSA with SHA-384.
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";

    /// RSA with SHA-512.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
}

/// Digest method URIs.
pub mod digest_algorithms {
    /// SHA-1 (legacy).
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

    /// SHA-256.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";

    /// SHA-384.
    pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";

    /// SHA-512.
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
}

/// Canonicalization method URIs.
pub mod canonicalization_algorithms {
    /// Exclusive XML Canonicalization 1.0 (omits comments).
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
}

/// Transform URIs.
pub mod transforms {
    /// Enveloped signature transform.
    pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
}
