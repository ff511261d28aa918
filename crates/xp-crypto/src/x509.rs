//! X.509 certificate decoding and thumbprints.
//!
//! A thumbprint is the SHA-1 digest of the certificate's DER encoding written
//! as 40 uppercase hex digits. Thumbprints are the lookup key for certificate
//! stores and trust lists, so parsing is lenient about case and separators.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use thiserror::Error;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::hash::sha1;
use crate::keys::{RsaVerifyingKey, SignatureError};

/// Error type for certificate handling.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// The DER structure is not a valid X.509 certificate.
    #[error("invalid certificate: {0}")]
    Parse(String),

    /// The PEM envelope is malformed or has the wrong label.
    #[error("invalid certificate PEM: {0}")]
    Pem(String),

    /// The base64 body could not be decoded.
    #[error("invalid certificate encoding: {0}")]
    Base64(String),

    /// A thumbprint string is not 40 hex digits.
    #[error("invalid thumbprint: {0}")]
    InvalidThumbprint(String),
}

/// SHA-1 certificate thumbprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Thumbprint(String);

impl Thumbprint {
    /// Computes the thumbprint of a DER encoded certificate.
    #[must_use]
    pub fn of(der: &[u8]) -> Self {
        Self(hex::encode_upper(sha1(der)))
    }

    /// Parses a thumbprint, ignoring case, whitespace and `:` separators.
    ///
    /// # Errors
    ///
    /// Returns an error unless exactly 40 hex digits remain.
    pub fn parse(s: &str) -> Result<Self, CertificateError> {
        // U+200E sneaks in when thumbprints are copied from certificate dialogs.
        let cleaned: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':' && *c != '\u{200e}')
            .collect();

        if cleaned.len() != 40 || !cleaned.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CertificateError::InvalidThumbprint(s.to_string()));
        }
        Ok(Self(cleaned.to_ascii_uppercase()))
    }

    /// Returns the uppercase hex form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Thumbprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Thumbprint {
    type Err = CertificateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A decoded X.509 certificate.
///
/// Only the parts the token engine needs are kept: the DER bytes (embedded in
/// signatures), the thumbprint, the subject for logging, the validity period
/// and the public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    thumbprint: Thumbprint,
    subject: String,
    not_before: i64,
    not_after: i64,
    public_key_der: Vec<u8>,
}

impl Certificate {
    /// Decodes a DER certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid certificate.
    pub fn from_der(der: Vec<u8>) -> Result<Self, CertificateError> {
        let (subject, not_before, not_after, public_key_der) = {
            let (_, cert) = X509Certificate::from_der(&der)
                .map_err(|e| CertificateError::Parse(e.to_string()))?;
            let validity = cert.validity();
            (
                cert.subject().to_string(),
                validity.not_before.timestamp(),
                validity.not_after.timestamp(),
                cert.public_key().raw.to_vec(),
            )
        };

        Ok(Self {
            thumbprint: Thumbprint::of(&der),
            der,
            subject,
            not_before,
            not_after,
            public_key_der,
        })
    }

    /// Decodes the first certificate of a PEM document.
    ///
    /// # Errors
    ///
    /// Returns an error if no `CERTIFICATE` block is found or it does not
    /// decode.
    pub fn from_pem(pem: &str) -> Result<Self, CertificateError> {
        let (_, pem) =
            parse_x509_pem(pem.as_bytes()).map_err(|e| CertificateError::Pem(e.to_string()))?;
        if pem.label != "CERTIFICATE" {
            return Err(CertificateError::Pem(format!(
                "expected CERTIFICATE block, found {}",
                pem.label
            )));
        }
        Self::from_der(pem.contents)
    }

    /// Decodes a base64 DER certificate, as found in `X509Certificate`
    /// elements. Embedded whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not base64 or not a certificate.
    pub fn from_base64(text: &str) -> Result<Self, CertificateError> {
        let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let der = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| CertificateError::Base64(e.to_string()))?;
        Self::from_der(der)
    }

    /// Returns the certificate as single-line base64 DER.
    #[must_use]
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.der)
    }

    /// Returns the SHA-1 thumbprint.
    #[must_use]
    pub const fn thumbprint(&self) -> &Thumbprint {
        &self.thumbprint
    }

    /// Returns the subject distinguished name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns true if `unix_time` is within the certificate validity period.
    #[must_use]
    pub const fn is_valid_at(&self, unix_time: i64) -> bool {
        unix_time >= self.not_before && unix_time <= self.not_after
    }

    /// Returns the certificate's RSA public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate does not carry a usable RSA key.
    pub fn verifying_key(&self) -> Result<RsaVerifyingKey, SignatureError> {
        RsaVerifyingKey::from_spki_der(&self.public_key_der)
    }
}
