//! Common test utilities and fixtures.

use std::path::{Path, PathBuf};

use xp_core::{StoreLocation, StoreName};
use xp_protocol_saml::{
    CertificateResolver, CertificateStore, StoreScope, TokenHandler, TokenReader, TrustStore,
};

/// Thumbprint of the trusted exchange signing certificate.
pub const SIGNING_THUMBPRINT: &str = "1BEE225E3BB3BA446082CCE2777E9A9CC4DB5E37";

/// Thumbprint of a certificate that is present in the store but not trusted.
pub const ROGUE_THUMBPRINT: &str = "B35F4CA804E30788B674312866D04BF1DC4CC3FA";

/// Root of the file-backed certificate store fixture.
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/store")
}

/// Scope holding the rogue certificate.
pub fn rogue_scope() -> StoreScope {
    StoreScope::new(StoreLocation::CurrentUser, StoreName::My)
}

/// Handler over the fixture store that trusts the `trusted-people` scope.
pub fn handler() -> anyhow::Result<TokenHandler> {
    let store = CertificateStore::new(fixture_root());
    let mut trust = TrustStore::new();
    trust.load_scope(&store, StoreScope::trusted_people())?;
    Ok(TokenHandler::new(
        CertificateResolver::new(store),
        TokenReader::new(trust),
    ))
}

/// Attributes the carrier sends back after a payment.
pub fn payment_attributes() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Payment Transaction ID", "abc-123"),
        ("Total Amount Paid", "99.99"),
        ("Payment Status", "Success"),
    ]
}

/// Writes a payment token signed by the trusted certificate.
pub fn payment_token(handler: &TokenHandler) -> anyhow::Result<String> {
    Ok(handler.write(
        payment_attributes(),
        "Carrier",
        "test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
    )?)
}
