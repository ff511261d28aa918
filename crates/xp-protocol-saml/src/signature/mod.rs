//! XML Signature support for SAML.
//!
//! Enveloped XML-DSig signatures over elements of the [`crate::xml`] tree.
//! Digests and `SignedInfo` are always computed over the exclusive canonical
//! form, the same rendering the serializer puts on the wire.
//!
//! # Signing Algorithms
//!
//! - RSA-SHA256 (default)
//! - RSA-SHA384
//! - RSA-SHA512
//! - RSA-SHA1, for partners that still require the legacy pair

mod signer;
mod validator;

pub use signer::*;
pub use validator::*;

use xp_crypto::HashAlgorithm;

use crate::error::{SamlError, SamlResult};
use crate::types::{canonicalization_algorithms, digest_algorithms, signature_algorithms};

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256.
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// Legacy RSA with SHA-1.
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Returns the corresponding digest algorithm URI.
    #[must_use]
    pub const fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => digest_algorithms::SHA256,
            Self::RsaSha384 => digest_algorithms::SHA384,
            Self::RsaSha512 => digest_algorithms::SHA512,
            Self::RsaSha1 => digest_algorithms::SHA1,
        }
    }

    /// Returns the hash the RSA signature is computed with.
    #[must_use]
    pub const fn hash_algorithm(&self) -> HashAlgorithm {
        match self {
            Self::RsaSha256 => HashAlgorithm::Sha256,
            Self::RsaSha384 => HashAlgorithm::Sha384,
            Self::RsaSha512 => HashAlgorithm::Sha512,
            Self::RsaSha1 => HashAlgorithm::Sha1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Parses a configuration name such as `rsa-sha256`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::UnsupportedAlgorithm`] for unknown names.
    pub fn from_name(name: &str) -> SamlResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rsa-sha256" | "rs256" => Ok(Self::RsaSha256),
            "rsa-sha384" | "rs384" => Ok(Self::RsaSha384),
            "rsa-sha512" | "rs512" => Ok(Self::RsaSha512),
            "rsa-sha1" | "rs1" => Ok(Self::RsaSha1),
            _ => Err(SamlError::UnsupportedAlgorithm(name.to_string())),
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }
}

/// Maps a digest method URI to its hash.
#[must_use]
pub fn digest_from_uri(uri: &str) -> Option<HashAlgorithm> {
    match uri {
        digest_algorithms::SHA1 => Some(HashAlgorithm::Sha1),
        digest_algorithms::SHA256 => Some(HashAlgorithm::Sha256),
        digest_algorithms::SHA384 => Some(HashAlgorithm::Sha384),
        digest_algorithms::SHA512 => Some(HashAlgorithm::Sha512),
        _ => None,
    }
}

/// Canonicalization algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanonicalizationAlgorithm {
    /// Exclusive C14N without comments.
    #[default]
    ExclusiveC14N,
}

impl CanonicalizationAlgorithm {
    /// Returns the URI for this canonicalization algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::ExclusiveC14N => canonicalization_algorithms::EXCLUSIVE_C14N,
        }
    }

    /// Parses a canonicalization algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            canonicalization_algorithms::EXCLUSIVE_C14N => Some(Self::ExclusiveC14N),
            _ => None,
        }
    }
}

/// XML Signature structure.
///
/// The parsed content of a `<ds:Signature>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm used.
    pub canonicalization: CanonicalizationAlgorithm,
    /// The digest algorithm of the reference.
    pub digest_algorithm: HashAlgorithm,
    /// The reference URI (`#` followed by the signed element's ID).
    pub reference_uri: String,
    /// The digest value (base64 encoded).
    pub digest_value: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// Embedded X.509 certificate (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

/// Configuration for signature creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureConfig {
    /// The signature algorithm to use.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm to use.
    pub canonicalization: CanonicalizationAlgorithm,
}

impl SignatureConfig {
    /// Creates a new signature configuration with the given algorithm.
    #[must_use]
    pub const fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            canonicalization: CanonicalizationAlgorithm::ExclusiveC14N,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_algorithm_uri_roundtrip() {
        for alg in [
            SignatureAlgorithm::RsaSha256,
            SignatureAlgorithm::RsaSha384,
            SignatureAlgorithm::RsaSha512,
            SignatureAlgorithm::RsaSha1,
        ] {
            assert_eq!(SignatureAlgorithm::from_uri(alg.uri()), Some(alg));
            assert_eq!(digest_from_uri(alg.digest_uri()), Some(alg.hash_algorithm()));
        }
    }

    #[test]
    fn legacy_pair_uses_sha1_uris() {
        let alg = SignatureAlgorithm::RsaSha1;
        assert!(alg.is_deprecated());
        assert_eq!(alg.uri(), "http://www.w3.org/2000/09/xmldsig#rsa-sha1");
        assert_eq!(alg.digest_uri(), "http://www.w3.org/2000/09/xmldsig#sha1");
    }

    #[test]
    fn names_from_configuration() {
        assert_eq!(
            SignatureAlgorithm::from_name("RSA-SHA1").unwrap(),
            SignatureAlgorithm::RsaSha1
        );
        assert_eq!(
            SignatureAlgorithm::from_name("rsa-sha256").unwrap(),
            SignatureAlgorithm::RsaSha256
        );
        let err = SignatureAlgorithm::from_name("hmac-sha256").unwrap_err();
        assert!(err.is_signing());
    }

    #[test]
    fn signature_config_default() {
        let config = SignatureConfig::default();
        assert_eq!(config.algorithm, SignatureAlgorithm::RsaSha256);
        assert_eq!(
            config.canonicalization.uri(),
            "http://www.w3.org/2001/10/xml-exc-c14n#"
        );
    }
}
