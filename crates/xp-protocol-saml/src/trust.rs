//! Trusted signer set.

use std::collections::BTreeSet;

use tracing::{debug, warn};
use xp_crypto::{Certificate, Thumbprint};

use crate::error::{SamlError, SamlResult};
use crate::resolver::{CertificateStore, StoreScope};

/// Set of certificate thumbprints whose signatures are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustStore {
    thumbprints: BTreeSet<Thumbprint>,
}

impl TrustStore {
    /// Creates an empty trust store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trust store from thumbprint strings.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidCertificate`] if a thumbprint is malformed.
    pub fn from_thumbprints<I, S>(thumbprints: I) -> SamlResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = Self::new();
        for thumbprint in thumbprints {
            let parsed = Thumbprint::parse(thumbprint.as_ref())
                .map_err(|e| SamlError::InvalidCertificate(e.to_string()))?;
            store.insert(parsed);
        }
        Ok(store)
    }

    /// Trusts every certificate of a store scope.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if the scope cannot be read.
    pub fn load_scope(&mut self, store: &CertificateStore, scope: StoreScope) -> SamlResult<usize> {
        let certificates = store.certificates(scope)?;
        if certificates.is_empty() {
            warn!(store = %scope, "trusted certificate store is empty");
        }
        for (certificate, _) in &certificates {
            self.trust(certificate);
        }
        Ok(certificates.len())
    }

    /// Adds a thumbprint.
    pub fn insert(&mut self, thumbprint: Thumbprint) {
        self.thumbprints.insert(thumbprint);
    }

    /// Adds a certificate's thumbprint.
    pub fn trust(&mut self, certificate: &Certificate) {
        debug!(thumbprint = %certificate.thumbprint(), "trusting certificate");
        self.insert(certificate.thumbprint().clone());
    }

    /// Returns true if the thumbprint is trusted.
    #[must_use]
    pub fn contains(&self, thumbprint: &Thumbprint) -> bool {
        self.thumbprints.contains(thumbprint)
    }

    /// Checks that `certificate` is trusted.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::UntrustedCertificate`] otherwise.
    pub fn check(&self, certificate: &Certificate) -> SamlResult<()> {
        if self.contains(certificate.thumbprint()) {
            Ok(())
        } else {
            Err(SamlError::UntrustedCertificate(
                certificate.thumbprint().to_string(),
            ))
        }
    }

    /// Number of trusted thumbprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.thumbprints.len()
    }

    /// Returns true if nothing is trusted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.thumbprints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture_store, rogue_credentials, signing_credentials, SIGNING_THUMBPRINT};

    #[test]
    fn loads_trusted_people_scope() {
        let mut trust = TrustStore::new();
        let loaded = trust
            .load_scope(&fixture_store(), StoreScope::trusted_people())
            .unwrap();
        assert_eq!(loaded, 1);
        assert!(trust.check(signing_credentials().certificate()).is_ok());

        let err = trust.check(rogue_credentials().certificate()).unwrap_err();
        assert!(err.is_trust());
        assert!(err.to_string().contains("not found in trusted store"));
    }

    #[test]
    fn thumbprints_are_normalized() {
        let trust = TrustStore::from_thumbprints([SIGNING_THUMBPRINT.to_lowercase()]).unwrap();
        assert_eq!(trust.len(), 1);
        assert!(trust.check(signing_credentials().certificate()).is_ok());

        assert!(TrustStore::from_thumbprints(["abc"]).is_err());
    }

    #[test]
    fn missing_scope_is_empty() {
        let mut trust = TrustStore::new();
        let loaded = trust
            .load_scope(&CertificateStore::new("/nonexistent"), StoreScope::trusted_people())
            .unwrap();
        assert_eq!(loaded, 0);
        assert!(trust.is_empty());
    }
}
