//! Signed response reader.
//!
//! Reading is a chain of hard preconditions: the document must parse, the
//! response must carry a signature with an embedded certificate, that
//! certificate must be trusted, the signature must verify, and only then are
//! attribute values extracted.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use xp_crypto::{Certificate, RsaVerifyingKey};

use crate::claims::{ClaimProfile, ExtractedClaims};
use crate::error::{SamlError, SamlResult};
use crate::signature::XmlSignatureValidator;
use crate::trust::TrustStore;
use crate::types::{Conditions, SAMLP_NS, SAML_NS, XMLDSIG_NS};
use crate::xml::{self, Element};

const CERTIFICATE_PATH: [(&str, &str); 3] = [
    (XMLDSIG_NS, "KeyInfo"),
    (XMLDSIG_NS, "X509Data"),
    (XMLDSIG_NS, "X509Certificate"),
];

/// Optional checks applied while reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Reject assertions outside their `Conditions` window.
    pub enforce_validity_window: bool,
    /// Also verify the assertion's own signature.
    pub verify_assertion_signature: bool,
    /// Accept RSA-SHA1 signatures and SHA-1 digests.
    pub allow_sha1: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            enforce_validity_window: false,
            verify_assertion_signature: false,
            allow_sha1: true,
        }
    }
}

impl From<&xp_core::config::ReaderConfig> for ReaderOptions {
    fn from(config: &xp_core::config::ReaderConfig) -> Self {
        Self {
            enforce_validity_window: config.enforce_validity_window,
            verify_assertion_signature: config.verify_assertion_signature,
            allow_sha1: config.allow_sha1,
        }
    }
}

/// Verifies signed SAML responses and extracts their claims.
#[derive(Debug, Clone)]
pub struct TokenReader {
    trust: TrustStore,
    options: ReaderOptions,
}

impl TokenReader {
    /// Creates a reader trusting the given store.
    #[must_use]
    pub fn new(trust: TrustStore) -> Self {
        Self {
            trust,
            options: ReaderOptions::default(),
        }
    }

    /// Sets the reader options.
    #[must_use]
    pub const fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the trust store.
    #[must_use]
    pub const fn trust(&self) -> &TrustStore {
        &self.trust
    }

    /// Returns the reader options.
    #[must_use]
    pub const fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Reads a response and extracts the attributes named by `profile`.
    ///
    /// # Errors
    ///
    /// Parse errors for malformed or incomplete documents and missing
    /// claims, trust errors for unknown signers, integrity errors for
    /// signatures that do not verify.
    pub fn read(&self, xml: &str, profile: &ClaimProfile) -> SamlResult<ExtractedClaims> {
        self.read_at(xml, profile, Utc::now())
    }

    /// Like [`TokenReader::read`], evaluating the validity window at `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenReader::read`].
    pub fn read_at(
        &self,
        xml: &str,
        profile: &ClaimProfile,
        now: DateTime<Utc>,
    ) -> SamlResult<ExtractedClaims> {
        let root = xml::parse(xml)?;
        let assertion = self.verify(&root)?;

        if self.options.enforce_validity_window {
            check_validity(assertion, now)?;
        }

        let claims = profile.extract(assertion)?;
        debug!(claims = claims.len(), "extracted claims");
        Ok(claims)
    }

    /// Verifies a parsed response and returns its assertion element.
    ///
    /// # Errors
    ///
    /// See [`TokenReader::read`].
    pub fn verify<'a>(&self, root: &'a Element) -> SamlResult<&'a Element> {
        if !root.is(SAMLP_NS, "Response") {
            return Err(SamlError::MissingElement("samlp:Response".to_string()));
        }
        let signature = root.select_required(&[(XMLDSIG_NS, "Signature")])?;
        let certificate_node = signature.select_required(&CERTIFICATE_PATH)?;

        let key = self.trusted_key(&certificate_node.text())?;
        let validator = XmlSignatureValidator::new().allow_sha1(self.options.allow_sha1);
        validator.validate(root, signature, &key).map_err(|e| {
            warn!(error = %e, "response signature rejected");
            e
        })?;

        let assertion = root.select_required(&[(SAML_NS, "Assertion")])?;

        if self.options.verify_assertion_signature {
            let assertion_signature = assertion.select_required(&[(XMLDSIG_NS, "Signature")])?;
            let assertion_key = match assertion_signature.select_required(&CERTIFICATE_PATH) {
                Ok(node) => self.trusted_key(&node.text())?,
                Err(_) => key,
            };
            validator
                .validate(assertion, assertion_signature, &assertion_key)
                .map_err(|e| {
                    warn!(error = %e, "assertion signature rejected");
                    e
                })?;
        }

        Ok(assertion)
    }

    /// Decodes an embedded certificate, checks trust and returns its key.
    fn trusted_key(&self, certificate_b64: &str) -> SamlResult<RsaVerifyingKey> {
        let certificate = Certificate::from_base64(certificate_b64)
            .map_err(|e| SamlError::InvalidCertificate(e.to_string()))?;

        self.trust.check(&certificate).map_err(|e| {
            warn!(
                thumbprint = %certificate.thumbprint(),
                subject = certificate.subject(),
                "certificate not in trusted store"
            );
            e
        })?;
        info!(thumbprint = %certificate.thumbprint(), "signing certificate trusted");

        certificate
            .verifying_key()
            .map_err(|e| SamlError::InvalidCertificate(e.to_string()))
    }
}

fn check_validity(assertion: &Element, now: DateTime<Utc>) -> SamlResult<()> {
    read_conditions(assertion)?.check(now)
}

/// Reads the `Conditions` window. A missing bound leaves that side open.
fn read_conditions(assertion: &Element) -> SamlResult<Conditions> {
    let element = assertion.select_required(&[(SAML_NS, "Conditions")])?;
    let bound = |name: &str, open: DateTime<Utc>| {
        element.attribute(name).map_or(Ok(open), parse_instant)
    };
    Ok(Conditions {
        not_before: bound("NotBefore", DateTime::<Utc>::MIN_UTC)?,
        not_on_or_after: bound("NotOnOrAfter", DateTime::<Utc>::MAX_UTC)?,
    })
}

fn parse_instant(value: &str) -> SamlResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| SamlError::XmlParse(format!("invalid timestamp {value}: {e}")))
}
