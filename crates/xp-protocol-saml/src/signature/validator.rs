//! XML Signature validation.
//!
//! Checks an enveloped signature against the element it claims to sign.
//! Trust in the key is decided elsewhere; this module only answers whether
//! the signature is intact.

use base64::Engine;
use tracing::{debug, warn};
use xp_crypto::RsaVerifyingKey;

use crate::error::{SamlError, SamlResult};
use crate::types::{transforms, XMLDSIG_NS};
use crate::xml::{canonicalize, Element};

use super::{digest_from_uri, CanonicalizationAlgorithm, SignatureAlgorithm, XmlSignature};

impl XmlSignature {
    /// Reads the signature fields from a `<ds:Signature>` element.
    ///
    /// # Errors
    ///
    /// Missing nodes yield [`SamlError::MissingElement`]. Unsupported
    /// algorithms yield [`SamlError::SignatureInvalid`].
    pub fn from_element(signature: &Element) -> SamlResult<Self> {
        let signed_info = signature.select_required(&[(XMLDSIG_NS, "SignedInfo")])?;
        let reference = signed_info.select_required(&[(XMLDSIG_NS, "Reference")])?;

        let c14n_uri = signed_info
            .select_required(&[(XMLDSIG_NS, "CanonicalizationMethod")])?
            .required_attribute("Algorithm")?;
        let canonicalization = CanonicalizationAlgorithm::from_uri(c14n_uri).ok_or_else(|| {
            SamlError::SignatureInvalid(format!("unsupported canonicalization {c14n_uri}"))
        })?;

        let method_uri = signed_info
            .select_required(&[(XMLDSIG_NS, "SignatureMethod")])?
            .required_attribute("Algorithm")?;
        let algorithm = SignatureAlgorithm::from_uri(method_uri).ok_or_else(|| {
            SamlError::SignatureInvalid(format!("unsupported signature method {method_uri}"))
        })?;

        let digest_uri = reference
            .select_required(&[(XMLDSIG_NS, "DigestMethod")])?
            .required_attribute("Algorithm")?;
        let digest_algorithm = digest_from_uri(digest_uri).ok_or_else(|| {
            SamlError::SignatureInvalid(format!("unsupported digest method {digest_uri}"))
        })?;

        if let Some(list) = reference.find_child(XMLDSIG_NS, "Transforms") {
            for transform in list.child_elements() {
                let uri = transform.required_attribute("Algorithm")?;
                if uri != transforms::ENVELOPED_SIGNATURE
                    && CanonicalizationAlgorithm::from_uri(uri).is_none()
                {
                    return Err(SamlError::SignatureInvalid(format!(
                        "unsupported transform {uri}"
                    )));
                }
            }
        }

        let x509_certificate = signature
            .select_required(&[
                (XMLDSIG_NS, "KeyInfo"),
                (XMLDSIG_NS, "X509Data"),
                (XMLDSIG_NS, "X509Certificate"),
            ])
            .ok()
            .map(Element::text);

        Ok(Self {
            algorithm,
            canonicalization,
            digest_algorithm,
            reference_uri: reference.attribute("URI").unwrap_or_default().to_string(),
            digest_value: reference
                .select_required(&[(XMLDSIG_NS, "DigestValue")])?
                .text(),
            signature_value: signature
                .select_required(&[(XMLDSIG_NS, "SignatureValue")])?
                .text(),
            x509_certificate,
        })
    }
}

/// XML signature validator.
#[derive(Debug, Clone, Copy)]
pub struct XmlSignatureValidator {
    /// Whether to accept SHA-1 based signatures and digests.
    allow_sha1: bool,
}

impl Default for XmlSignatureValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlSignatureValidator {
    /// Creates a validator that accepts the legacy SHA-1 pair.
    #[must_use]
    pub const fn new() -> Self {
        Self { allow_sha1: true }
    }

    /// Sets whether SHA-1 based signatures are accepted.
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Validates the enveloped `signature` of `signed`.
    ///
    /// `signature` must be a node inside `signed`; it is left out of the
    /// digest by identity.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureInvalid`] if the reference does not point
    /// at `signed`, the digest differs, or the signature value does not
    /// verify under `key`.
    pub fn validate(
        &self,
        signed: &Element,
        signature: &Element,
        key: &RsaVerifyingKey,
    ) -> SamlResult<XmlSignature> {
        let parsed = XmlSignature::from_element(signature)?;

        if (parsed.algorithm.is_deprecated() || parsed.digest_algorithm.is_legacy())
            && !self.allow_sha1
        {
            return Err(SamlError::SignatureInvalid(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }
        if parsed.algorithm.is_deprecated() {
            warn!("accepting legacy RSA-SHA1 signature");
        }

        let id = signed.required_attribute("ID")?;
        if parsed.reference_uri != format!("#{id}") {
            return Err(SamlError::SignatureInvalid(format!(
                "reference {} does not point at the signed element {id}",
                parsed.reference_uri
            )));
        }

        self.verify_digest(signed, signature, &parsed)?;
        self.verify_signature(signature, &parsed, key)?;

        debug!(reference = %parsed.reference_uri, "signature verified");
        Ok(parsed)
    }

    fn verify_digest(
        &self,
        signed: &Element,
        signature: &Element,
        parsed: &XmlSignature,
    ) -> SamlResult<()> {
        let expected = decode_base64(&parsed.digest_value)?;
        let actual = xp_crypto::hash(
            parsed.digest_algorithm,
            canonicalize(signed, Some(signature)).as_bytes(),
        );
        if actual != expected {
            return Err(SamlError::SignatureInvalid(format!(
                "digest mismatch for {}",
                parsed.reference_uri
            )));
        }
        Ok(())
    }

    fn verify_signature(
        &self,
        signature: &Element,
        parsed: &XmlSignature,
        key: &RsaVerifyingKey,
    ) -> SamlResult<()> {
        let signed_info = signature.select_required(&[(XMLDSIG_NS, "SignedInfo")])?;
        let value = decode_base64(&parsed.signature_value)?;

        key.verify(
            parsed.algorithm.hash_algorithm(),
            canonicalize(signed_info, None).as_bytes(),
            &value,
        )
        .map_err(|e| SamlError::SignatureInvalid(e.to_string()))
    }
}

/// Decodes base64 element content, ignoring line breaks.
fn decode_base64(text: &str) -> SamlResult<Vec<u8>> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| SamlError::SignatureInvalid(format!("invalid base64 value: {e}")))
}
