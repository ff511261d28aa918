//! SAML 2.0 token engine for the Exchange and Carrier portals.
//!
//! The portals hand users to each other with a signed SAML response posted
//! through the browser. This crate covers both ends of that exchange:
//!
//! - **Writing** - build an assertion from an attribute mapping, sign it,
//!   wrap it in a response, sign the response and serialize it
//! - **Reading** - parse the response, check the embedded certificate
//!   against a trust store, verify the signature and extract claims
//!
//! # Architecture
//!
//! - [`types`] - Assertion and response models
//! - [`xml`] - Namespace-aware DOM, parser and exclusive canonicalization
//! - [`signature`] - Enveloped XML-DSig signing and validation
//! - [`resolver`] - Certificate store and signing credential lookup
//! - [`trust`] - Trusted signer set
//! - [`claims`] - Attribute to claim profiles
//! - [`handler`] - The write and read entry points
//! - [`bindings`] - HTTP-POST transport encoding
//!
//! # Example
//!
//! ```rust,ignore
//! use xp_protocol_saml::{StoreScope, TokenHandler};
//!
//! let handler = TokenHandler::from_config(&config)?;
//! let xml = handler.write(
//!     [("Payment Status", "Success")],
//!     "Carrier",
//!     "test",
//!     "1BEE225E3BB3BA446082CCE2777E9A9CC4DB5E37",
//!     StoreScope::default(),
//! )?;
//! let claims = handler.read(&xml)?;
//! ```
//!
//! # Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod claims;
pub mod error;
pub mod handler;
pub mod reader;
pub mod resolver;
pub mod serializer;
pub mod signature;
pub mod trust;
pub mod types;
pub mod xml;

pub use claims::{ClaimProfile, ExtractedClaims};
pub use error::{ErrorKind, SamlError, SamlResult};
pub use handler::TokenHandler;
pub use reader::{ReaderOptions, TokenReader};
pub use resolver::{CertificateResolver, CertificateStore, SigningCredentials, StoreScope};
pub use trust::TrustStore;
pub use types::*;

#[cfg(test)]
pub(crate) mod testing {
    use std::path::{Path, PathBuf};

    use crate::handler::TokenHandler;
    use crate::reader::TokenReader;
    use crate::resolver::{CertificateResolver, CertificateStore, SigningCredentials, StoreScope};
    use crate::trust::TrustStore;

    pub const SIGNING_THUMBPRINT: &str = "1BEE225E3BB3BA446082CCE2777E9A9CC4DB5E37";
    pub const ROGUE_THUMBPRINT: &str = "B35F4CA804E30788B674312866D04BF1DC4CC3FA";

    pub fn fixture_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/store")
    }

    pub fn fixture_store() -> CertificateStore {
        CertificateStore::new(fixture_root())
    }

    pub fn signing_credentials() -> SigningCredentials {
        SigningCredentials::from_pem(
            include_str!("../../../tests/fixtures/store/local-machine/my/exchange-signing.crt"),
            include_str!("../../../tests/fixtures/store/local-machine/my/exchange-signing.key"),
        )
        .unwrap()
    }

    pub fn rogue_credentials() -> SigningCredentials {
        SigningCredentials::from_pem(
            include_str!("../../../tests/fixtures/store/current-user/my/rogue.crt"),
            include_str!("../../../tests/fixtures/store/current-user/my/rogue.key"),
        )
        .unwrap()
    }

    pub fn fixture_handler() -> TokenHandler {
        let store = fixture_store();
        let mut trust = TrustStore::new();
        trust.load_scope(&store, StoreScope::trusted_people()).unwrap();
        TokenHandler::new(CertificateResolver::new(store), TokenReader::new(trust))
    }
}
