//! Token handler.
//!
//! The two entry points of the engine. `write` turns an attribute mapping
//! into a signed, serialized SAML response; `read` turns one back into
//! claims after establishing trust and integrity.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::claims::{ClaimProfile, ExtractedClaims};
use crate::error::{SamlError, SamlResult};
use crate::reader::{ReaderOptions, TokenReader};
use crate::resolver::{CertificateResolver, CertificateStore, SigningCredentials, StoreScope};
use crate::serializer::{assertion_element, response_element, serialize};
use crate::signature::{SignatureAlgorithm, SignatureConfig, XmlSigner};
use crate::trust::TrustStore;
use crate::types::{AssertionBuilder, ResponseBuilder};

/// Writes and reads signed SAML tokens.
#[derive(Debug, Clone)]
pub struct TokenHandler {
    resolver: CertificateResolver,
    reader: TokenReader,
    signature_config: SignatureConfig,
    profile: ClaimProfile,
}

impl TokenHandler {
    /// Creates a handler with the default algorithm and the payment profile.
    #[must_use]
    pub fn new(resolver: CertificateResolver, reader: TokenReader) -> Self {
        Self {
            resolver,
            reader,
            signature_config: SignatureConfig::default(),
            profile: ClaimProfile::payment(),
        }
    }

    /// Builds a handler from configuration.
    ///
    /// # Errors
    ///
    /// Fails for an unknown signature algorithm, an incomplete or invalid
    /// override certificate, malformed trusted thumbprints, or an unreadable
    /// trusted store.
    pub fn from_config(config: &xp_core::Config) -> SamlResult<Self> {
        let algorithm = SignatureAlgorithm::from_name(&config.signing.algorithm)?;
        let store = CertificateStore::new(&config.store.root);

        let mut resolver = CertificateResolver::new(store.clone());
        match (
            &config.signing.override_certificate,
            &config.signing.override_private_key,
        ) {
            (Some(certificate), Some(key)) => {
                resolver = resolver.with_override(SigningCredentials::from_files(certificate, key)?);
            }
            (None, None) => {}
            _ => {
                return Err(SamlError::CertificateStore(
                    "override certificate and private key must be configured together".to_string(),
                ));
            }
        }

        let mut trust = TrustStore::from_thumbprints(&config.trust.thumbprints)?;
        if config.trust.load_store {
            trust.load_scope(
                &store,
                StoreScope::new(config.trust.store_location, config.trust.store_name),
            )?;
        }

        let reader = TokenReader::new(trust).with_options(ReaderOptions::from(&config.reader));
        Ok(Self::new(resolver, reader)
            .with_signature_config(SignatureConfig::with_algorithm(algorithm)))
    }

    /// Sets the signature configuration used by `write`.
    #[must_use]
    pub const fn with_signature_config(mut self, config: SignatureConfig) -> Self {
        self.signature_config = config;
        self
    }

    /// Sets the profile used by `read`.
    #[must_use]
    pub fn with_profile(mut self, profile: ClaimProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Returns the certificate resolver.
    #[must_use]
    pub const fn resolver(&self) -> &CertificateResolver {
        &self.resolver
    }

    /// Returns the reader.
    #[must_use]
    pub const fn reader(&self) -> &TokenReader {
        &self.reader
    }

    /// Returns the signature configuration.
    #[must_use]
    pub const fn signature_config(&self) -> &SignatureConfig {
        &self.signature_config
    }

    /// Writes a signed SAML response carrying `attributes`.
    ///
    /// Attributes with empty values are omitted; a repeated name keeps its
    /// last value.
    ///
    /// # Errors
    ///
    /// Returns a signing error if a value holds a character XML cannot
    /// carry, if no credentials are found for `certificate_id` in `scope`,
    /// or if signing fails.
    pub fn write<I, K, V>(
        &self,
        attributes: I,
        issuer: &str,
        subject: &str,
        certificate_id: &str,
        scope: StoreScope,
    ) -> SamlResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.write_at(attributes, issuer, subject, certificate_id, scope, Utc::now())
    }

    /// Like [`TokenHandler::write`], issuing the token at `now`.
    ///
    /// # Errors
    ///
    /// See [`TokenHandler::write`].
    #[instrument(skip(self, attributes), fields(store = %scope))]
    pub fn write_at<I, K, V>(
        &self,
        attributes: I,
        issuer: &str,
        subject: &str,
        certificate_id: &str,
        scope: StoreScope,
        now: DateTime<Utc>,
    ) -> SamlResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let assertion = AssertionBuilder::new(issuer, subject)
            .attributes(attributes)
            .build_at(now);
        assertion.check_characters()?;

        let credentials = self.resolver.resolve(certificate_id, scope)?;
        let signer = XmlSigner::new(credentials).with_config(self.signature_config);
        let mut signed_assertion = assertion_element(&assertion);
        signer.sign(&mut signed_assertion)?;

        let response = ResponseBuilder::new(issuer)
            .issue_instant(now)
            .build(&assertion, signed_assertion);
        let mut signed_response = response_element(&response);
        signer.sign(&mut signed_response)?;

        info!(
            assertion_id = %assertion.id,
            response_id = %response.id,
            attributes = assertion.attribute_statement.attributes.len(),
            algorithm = self.signature_config.algorithm.uri(),
            "wrote signed response"
        );
        Ok(serialize(&signed_response))
    }

    /// Reads a token with the handler's profile.
    ///
    /// # Errors
    ///
    /// See [`TokenReader::read`].
    pub fn read(&self, xml: &str) -> SamlResult<ExtractedClaims> {
        self.reader.read(xml, &self.profile)
    }

    /// Reads a token with an explicit profile.
    ///
    /// # Errors
    ///
    /// See [`TokenReader::read`].
    pub fn read_with(&self, xml: &str, profile: &ClaimProfile) -> SamlResult<ExtractedClaims> {
        self.reader.read(xml, profile)
    }
}
