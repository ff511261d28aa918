//! Signing certificate resolution.
//!
//! Certificates live in a file-backed store laid out by scope:
//! `<root>/<location>/<name>/` holds PEM certificates (`*.crt`, `*.pem`),
//! each optionally accompanied by its private key in `<stem>.key`.
//! A [`CertificateResolver`] looks certificates up by thumbprint, unless it
//! was built with explicit override credentials, which then always win.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use xp_core::{StoreLocation, StoreName};
use xp_crypto::{Certificate, RsaSigningKey, Thumbprint};

use crate::error::{SamlError, SamlResult};

/// A certificate store scope: location and store name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StoreScope {
    /// Machine or user location.
    pub location: StoreLocation,
    /// Store within the location.
    pub name: StoreName,
}

impl StoreScope {
    /// Creates a scope.
    #[must_use]
    pub const fn new(location: StoreLocation, name: StoreName) -> Self {
        Self { location, name }
    }

    /// The machine-wide trusted people store.
    #[must_use]
    pub const fn trusted_people() -> Self {
        Self::new(StoreLocation::LocalMachine, StoreName::TrustedPeople)
    }

    /// Directory of this scope relative to the store root.
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        Path::new(self.location.as_str()).join(self.name.as_str())
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location, self.name)
    }
}

/// A certificate together with its private key.
#[derive(Debug, Clone)]
pub struct SigningCredentials {
    certificate: Certificate,
    key: RsaSigningKey,
}

impl SigningCredentials {
    /// Pairs a certificate with its private key.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if the key does not belong to
    /// the certificate.
    pub fn new(certificate: Certificate, key: RsaSigningKey) -> SamlResult<Self> {
        let public = certificate
            .verifying_key()
            .map_err(|e| SamlError::CertificateStore(e.to_string()))?;
        if !key.verifying_key().same_key(&public) {
            return Err(SamlError::CertificateStore(format!(
                "private key does not match certificate {}",
                certificate.thumbprint()
            )));
        }
        Ok(Self { certificate, key })
    }

    /// Builds credentials from PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if either PEM is invalid or
    /// they do not match.
    pub fn from_pem(certificate_pem: &str, key_pem: &str) -> SamlResult<Self> {
        let certificate = Certificate::from_pem(certificate_pem)
            .map_err(|e| SamlError::CertificateStore(e.to_string()))?;
        let key = RsaSigningKey::from_pem(key_pem)
            .map_err(|e| SamlError::CertificateStore(e.to_string()))?;
        Self::new(certificate, key)
    }

    /// Loads credentials from a certificate file and a key file.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if a file cannot be read or
    /// the contents are invalid.
    pub fn from_files(certificate_path: &Path, key_path: &Path) -> SamlResult<Self> {
        Self::from_pem(&read_file(certificate_path)?, &read_file(key_path)?)
    }

    /// Returns the certificate.
    #[must_use]
    pub const fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Returns the private key.
    #[must_use]
    pub const fn key(&self) -> &RsaSigningKey {
        &self.key
    }
}

fn read_file(path: &Path) -> SamlResult<String> {
    fs::read_to_string(path)
        .map_err(|e| SamlError::CertificateStore(format!("{}: {e}", path.display())))
}

/// File-backed certificate store.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    root: PathBuf,
}

impl CertificateStore {
    /// Opens the store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists the certificates of a scope with their file paths.
    ///
    /// A scope without a directory is empty. Files that fail to decode are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if the directory cannot be read.
    pub fn certificates(&self, scope: StoreScope) -> SamlResult<Vec<(Certificate, PathBuf)>> {
        let dir = self.root.join(scope.relative_path());
        if !dir.is_dir() {
            debug!(store = %scope, path = %dir.display(), "certificate store directory missing");
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| SamlError::CertificateStore(format!("{}: {e}", dir.display())))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("crt" | "pem")
                )
            })
            .collect();
        paths.sort();

        let mut certificates = Vec::with_capacity(paths.len());
        for path in paths {
            match Certificate::from_pem(&read_file(&path)?) {
                Ok(certificate) => certificates.push((certificate, path)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable certificate"),
            }
        }
        Ok(certificates)
    }

    /// Finds a certificate by thumbprint.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if the store cannot be read.
    pub fn find(
        &self,
        thumbprint: &Thumbprint,
        scope: StoreScope,
    ) -> SamlResult<Option<(Certificate, PathBuf)>> {
        Ok(self
            .certificates(scope)?
            .into_iter()
            .find(|(certificate, _)| certificate.thumbprint() == thumbprint))
    }

    /// Finds a certificate by thumbprint and loads its private key.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateStore`] if the certificate has no
    /// readable key file or the key does not match.
    pub fn find_credentials(
        &self,
        thumbprint: &Thumbprint,
        scope: StoreScope,
    ) -> SamlResult<Option<SigningCredentials>> {
        let Some((certificate, path)) = self.find(thumbprint, scope)? else {
            return Ok(None);
        };

        let key_path = path.with_extension("key");
        if !key_path.is_file() {
            return Err(SamlError::CertificateStore(format!(
                "certificate {thumbprint} in {scope} has no private key"
            )));
        }
        let key = RsaSigningKey::from_pem(&read_file(&key_path)?)
            .map_err(|e| SamlError::CertificateStore(e.to_string()))?;
        SigningCredentials::new(certificate, key).map(Some)
    }
}

/// Resolves signing credentials by thumbprint and scope.
#[derive(Debug, Clone)]
pub struct CertificateResolver {
    store: CertificateStore,
    override_credentials: Option<SigningCredentials>,
}

impl CertificateResolver {
    /// Creates a resolver over a certificate store.
    #[must_use]
    pub const fn new(store: CertificateStore) -> Self {
        Self {
            store,
            override_credentials: None,
        }
    }

    /// Uses `credentials` for every lookup instead of the store.
    #[must_use]
    pub fn with_override(mut self, credentials: SigningCredentials) -> Self {
        self.override_credentials = Some(credentials);
        self
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &CertificateStore {
        &self.store
    }

    /// Resolves the signing credentials for `certificate_id` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::CertificateNotFound`] if no certificate matches,
    /// or [`SamlError::CertificateStore`] if it has no usable key.
    pub fn resolve(&self, certificate_id: &str, scope: StoreScope) -> SamlResult<SigningCredentials> {
        if let Some(credentials) = &self.override_credentials {
            debug!(
                thumbprint = %credentials.certificate().thumbprint(),
                "using override signing certificate"
            );
            return Ok(credentials.clone());
        }

        let not_found = || SamlError::CertificateNotFound {
            thumbprint: certificate_id.to_string(),
            scope: scope.to_string(),
        };
        let thumbprint = Thumbprint::parse(certificate_id).map_err(|_| not_found())?;

        let credentials = self
            .store
            .find_credentials(&thumbprint, scope)?
            .ok_or_else(not_found)?;

        info!(
            thumbprint = %thumbprint,
            store = %scope,
            subject = credentials.certificate().subject(),
            "resolved signing certificate"
        );
        Ok(credentials)
    }
}
