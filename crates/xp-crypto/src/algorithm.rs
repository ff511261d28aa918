//! Digest algorithms.
//!
//! Only the digests used by XML signatures are modelled here; signature
//! algorithm URIs live with the XML signature code.

/// Digest algorithms usable for signature references and RSA signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-1 (legacy interoperability only).
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Returns true for digests kept only for compatibility.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Sha1)
    }
}
