//! XML Signature creation.
//!
//! Signs elements of the XML tree with an enveloped signature inserted right
//! after the element's `Issuer`.

use base64::Engine;
use tracing::debug;

use crate::error::{SamlError, SamlResult};
use crate::resolver::SigningCredentials;
use crate::types::{transforms, DS_PREFIX, SAML_NS, XMLDSIG_NS};
use crate::xml::{canonicalize, Element, Node};

use super::{CanonicalizationAlgorithm, SignatureAlgorithm, SignatureConfig};

/// XML element signer.
///
/// Signs elements with the configured private key and embeds the matching
/// certificate in `KeyInfo`.
#[derive(Debug, Clone)]
pub struct XmlSigner {
    credentials: SigningCredentials,
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a new signer using the default configuration.
    #[must_use]
    pub fn new(credentials: SigningCredentials) -> Self {
        Self {
            credentials,
            config: SignatureConfig::default(),
        }
    }

    /// Sets the signature configuration.
    #[must_use]
    pub const fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the signature configuration.
    #[must_use]
    pub const fn config(&self) -> &SignatureConfig {
        &self.config
    }

    /// Returns the credentials used for signing.
    #[must_use]
    pub const fn credentials(&self) -> &SigningCredentials {
        &self.credentials
    }

    /// Signs an element in place.
    ///
    /// The element must carry an `ID` attribute and must not already contain
    /// a signature. The `<ds:Signature>` is inserted after the `saml:Issuer`
    /// child, or first if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureCreation`] if the element cannot be
    /// referenced or the RSA operation fails.
    pub fn sign(&self, element: &mut Element) -> SamlResult<()> {
        let id = element
            .attribute("ID")
            .ok_or_else(|| {
                SamlError::SignatureCreation(format!("{} has no ID", element.display_name()))
            })?
            .to_string();
        if element.find_child(XMLDSIG_NS, "Signature").is_some() {
            return Err(SamlError::SignatureCreation(format!(
                "element {id} is already signed"
            )));
        }

        let algorithm = self.config.algorithm;
        let digest = xp_crypto::hash(
            algorithm.hash_algorithm(),
            canonicalize(element, None).as_bytes(),
        );
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest);

        let signed_info =
            build_signed_info(&id, &digest_b64, algorithm, self.config.canonicalization);
        let signature_value = self
            .credentials
            .key()
            .sign(
                algorithm.hash_algorithm(),
                canonicalize(&signed_info, None).as_bytes(),
            )
            .map_err(|e| SamlError::SignatureCreation(e.to_string()))?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature_value);

        let signature = build_signature_element(
            signed_info,
            signature_b64,
            self.credentials.certificate().to_base64(),
        );

        let position = element
            .child_position(SAML_NS, "Issuer")
            .map_or(0, |index| index + 1);
        element
            .children
            .insert(position, Node::Element(signature));

        debug!(
            reference = %id,
            algorithm = algorithm.uri(),
            "signed element"
        );
        Ok(())
    }
}

fn ds(local_name: &str) -> Element {
    Element::qualified(DS_PREFIX, XMLDSIG_NS, local_name)
}

/// Builds the SignedInfo element.
fn build_signed_info(
    reference_id: &str,
    digest_b64: &str,
    algorithm: SignatureAlgorithm,
    canonicalization: CanonicalizationAlgorithm,
) -> Element {
    ds("SignedInfo")
        .with_child(ds("CanonicalizationMethod").with_attribute("Algorithm", canonicalization.uri()))
        .with_child(ds("SignatureMethod").with_attribute("Algorithm", algorithm.uri()))
        .with_child(
            ds("Reference")
                .with_attribute("URI", format!("#{reference_id}"))
                .with_child(
                    ds("Transforms")
                        .with_child(
                            ds("Transform")
                                .with_attribute("Algorithm", transforms::ENVELOPED_SIGNATURE),
                        )
                        .with_child(ds("Transform").with_attribute("Algorithm", canonicalization.uri())),
                )
                .with_child(ds("DigestMethod").with_attribute("Algorithm", algorithm.digest_uri()))
                .with_child(ds("DigestValue").with_text(digest_b64)),
        )
}

/// Builds the complete Signature element.
fn build_signature_element(
    signed_info: Element,
    signature_value: String,
    certificate_b64: String,
) -> Element {
    ds("Signature")
        .with_child(signed_info)
        .with_child(ds("SignatureValue").with_text(signature_value))
        .with_child(
            ds("KeyInfo").with_child(
                ds("X509Data").with_child(ds("X509Certificate").with_text(certificate_b64)),
            ),
        )
}
