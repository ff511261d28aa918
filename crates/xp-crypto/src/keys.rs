//! RSA key management and signing operations.
//!
//! XML signatures use RSA PKCS#1 v1.5 with the digest named by the signature
//! method URI. Private keys are accepted as PKCS#8 (`PRIVATE KEY`) or
//! PKCS#1 (`RSA PRIVATE KEY`) PEM.

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;

use crate::algorithm::HashAlgorithm;

/// Error type for RSA key handling, signing and verification.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// The key could not be decoded or is too short.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The RSA signing operation failed.
    #[error("RSA signing failed: {0}")]
    Signing(String),

    /// The signature does not match the data and key.
    #[error("signature verification failed")]
    Verification,
}

/// Smallest modulus accepted for signing or verification.
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// RSA private key used to sign XML signatures.
#[derive(Clone)]
pub struct RsaSigningKey {
    key: RsaPrivateKey,
}

impl std::fmt::Debug for RsaSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSigningKey")
            .field("bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

impl RsaSigningKey {
    /// Creates a signing key from a PEM encoded private key.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::InvalidKey`] if the PEM is neither PKCS#8 nor
    /// PKCS#1, or the key is shorter than [`MIN_RSA_KEY_BITS`].
    pub fn from_pem(pem: &str) -> Result<Self, SignatureError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| SignatureError::InvalidKey(format!("invalid RSA private key PEM: {e}")))?;
        Self::from_key(key)
    }

    fn from_key(key: RsaPrivateKey) -> Result<Self, SignatureError> {
        let bits = key.size() * 8;
        if bits < MIN_RSA_KEY_BITS {
            return Err(SignatureError::InvalidKey(format!(
                "RSA key size {bits} bits is below the minimum of {MIN_RSA_KEY_BITS} bits"
            )));
        }
        Ok(Self { key })
    }

    /// Returns the modulus size in bits.
    #[must_use]
    pub fn key_bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Returns the matching public key.
    #[must_use]
    pub fn verifying_key(&self) -> RsaVerifyingKey {
        RsaVerifyingKey {
            key: self.key.to_public_key(),
        }
    }

    /// Signs `data` with RSA PKCS#1 v1.5 using the given digest.
    ///
    /// # Errors
    ///
    /// Returns an error if the RSA operation fails.
    pub fn sign(&self, algorithm: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let key = self.key.clone();
        let signature = match algorithm {
            HashAlgorithm::Sha1 => SigningKey::<Sha1>::new(key).try_sign(data),
            HashAlgorithm::Sha256 => SigningKey::<Sha256>::new(key).try_sign(data),
            HashAlgorithm::Sha384 => SigningKey::<Sha384>::new(key).try_sign(data),
            HashAlgorithm::Sha512 => SigningKey::<Sha512>::new(key).try_sign(data),
        }
        .map_err(|e| SignatureError::Signing(e.to_string()))?;

        Ok(signature.to_vec())
    }
}

/// RSA public key used to verify XML signatures.
#[derive(Debug, Clone)]
pub struct RsaVerifyingKey {
    key: RsaPublicKey,
}

impl RsaVerifyingKey {
    /// Creates a verifying key from a DER `SubjectPublicKeyInfo`.
    ///
    /// Bare PKCS#1 `RSAPublicKey` structures are accepted as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not an RSA key or is too short.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, SignatureError> {
        let key = RsaPublicKey::from_public_key_der(der)
            .or_else(|_| RsaPublicKey::from_pkcs1_der(der))
            .map_err(|e| SignatureError::InvalidKey(format!("invalid RSA public key: {e}")))?;

        let bits = key.size() * 8;
        if bits < MIN_RSA_KEY_BITS {
            return Err(SignatureError::InvalidKey(format!(
                "RSA key size {bits} bits is below the minimum of {MIN_RSA_KEY_BITS} bits"
            )));
        }
        Ok(Self { key })
    }

    /// Verifies an RSA PKCS#1 v1.5 signature over `data`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Verification`] if the signature does not match.
    pub fn verify(
        &self,
        algorithm: HashAlgorithm,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        let signature =
            Signature::try_from(signature).map_err(|_| SignatureError::Verification)?;
        let key = self.key.clone();

        let result = match algorithm {
            HashAlgorithm::Sha1 => VerifyingKey::<Sha1>::new(key).verify(data, &signature),
            HashAlgorithm::Sha256 => VerifyingKey::<Sha256>::new(key).verify(data, &signature),
            HashAlgorithm::Sha384 => VerifyingKey::<Sha384>::new(key).verify(data, &signature),
            HashAlgorithm::Sha512 => VerifyingKey::<Sha512>::new(key).verify(data, &signature),
        };
        result.map_err(|_| SignatureError::Verification)
    }

    /// Returns true if both keys have the same modulus and exponent.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
