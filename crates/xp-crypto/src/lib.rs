//! # xp-crypto
//!
//! Cryptographic operations for the exchange portal token engine using the
//! RustCrypto `rsa`, `sha1` and `sha2` crates.
//!
//! - [`hash`] computes message digests for XML signature references
//! - [`keys`] signs and verifies with RSA PKCS#1 v1.5
//! - [`x509`] decodes certificates and computes their SHA-1 thumbprints
//!
//! ## Legacy algorithms
//!
//! SHA-1 is available only because deployed partners still exchange
//! RSA-SHA1 signed tokens. New configurations default to SHA-256.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod keys;
pub mod x509;

pub use algorithm::HashAlgorithm;
pub use hash::{hash, sha1};
pub use keys::{RsaSigningKey, RsaVerifyingKey, SignatureError};
pub use x509::{Certificate, CertificateError, Thumbprint};
