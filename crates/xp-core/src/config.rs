//! Configuration management for the token engine.
//!
//! Configuration is loaded from a TOML file, from `XP_*` environment variables
//! (with `.env` support), or both: environment values override file values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings used when writing tokens.
    pub signing: SigningConfig,
    /// File-backed certificate store.
    pub store: StoreConfig,
    /// Trusted signer thumbprints for reading tokens.
    pub trust: TrustConfig,
    /// Token reader options.
    pub reader: ReaderConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Issuer name written into the response and assertion.
    pub issuer: String,
    /// Subject name written into the assertion.
    pub subject: String,
    /// Thumbprint of the signing certificate.
    pub certificate_id: String,
    /// Store location searched for the signing certificate.
    pub store_location: StoreLocation,
    /// Store name searched for the signing certificate.
    pub store_name: StoreName,
    /// Signature algorithm name (`rsa-sha256`, `rsa-sha384`, `rsa-sha512`,
    /// or the legacy `rsa-sha1`).
    pub algorithm: String,
    /// PEM certificate used instead of the store lookup.
    pub override_certificate: Option<PathBuf>,
    /// PEM private key paired with `override_certificate`.
    pub override_private_key: Option<PathBuf>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            issuer: "Carrier".to_string(),
            subject: "test".to_string(),
            certificate_id: String::new(),
            store_location: StoreLocation::LocalMachine,
            store_name: StoreName::My,
            algorithm: "rsa-sha256".to_string(),
            override_certificate: None,
            override_private_key: None,
        }
    }
}

/// Certificate store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory; scopes live in `<root>/<location>/<name>/`.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("certs"),
        }
    }
}

/// Trust configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Explicitly trusted certificate thumbprints.
    pub thumbprints: Vec<String>,
    /// Whether to also trust every certificate found in the trusted store scope.
    pub load_store: bool,
    /// Location of the trusted store scope.
    pub store_location: StoreLocation,
    /// Name of the trusted store scope.
    pub store_name: StoreName,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            thumbprints: Vec::new(),
            load_store: true,
            store_location: StoreLocation::LocalMachine,
            store_name: StoreName::TrustedPeople,
        }
    }
}

/// Token reader options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Reject tokens outside their NotBefore/NotOnOrAfter window.
    pub enforce_validity_window: bool,
    /// Also verify the assertion's own signature when one is present.
    pub verify_assertion_signature: bool,
    /// Accept RSA-SHA1 signatures and SHA-1 digests.
    pub allow_sha1: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            enforce_validity_window: false,
            verify_assertion_signature: false,
            allow_sha1: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Certificate store location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreLocation {
    /// Machine-wide store.
    #[default]
    LocalMachine,
    /// Store of the current user.
    CurrentUser,
}

impl StoreLocation {
    /// Returns the directory name for this location.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalMachine => "local-machine",
            Self::CurrentUser => "current-user",
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreLocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_name(s).as_str() {
            "localmachine" => Ok(Self::LocalMachine),
            "currentuser" => Ok(Self::CurrentUser),
            _ => Err(Error::Validation(format!("unknown store location: {s}"))),
        }
    }
}

/// Certificate store name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreName {
    /// Personal certificates with private keys.
    #[default]
    My,
    /// Directly trusted peer certificates.
    TrustedPeople,
    /// Trusted root authorities.
    Root,
}

impl StoreName {
    /// Returns the directory name for this store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::My => "my",
            Self::TrustedPeople => "trusted-people",
            Self::Root => "root",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_name(s).as_str() {
            "my" | "personal" => Ok(Self::My),
            "trustedpeople" => Ok(Self::TrustedPeople),
            "root" => Ok(Self::Root),
            _ => Err(Error::Validation(format!("unknown store name: {s}"))),
        }
    }
}

/// Accepts `trusted-people`, `trusted_people` and `TrustedPeople` alike.
fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads an optional TOML file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or any variable cannot be parsed.
    pub fn load_layered(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) if path.exists() => Self::load(path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `XP_*` overrides using the given variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("XP_SIGNING_ISSUER") {
            self.signing.issuer = v;
        }
        if let Some(v) = lookup("XP_SIGNING_SUBJECT") {
            self.signing.subject = v;
        }
        if let Some(v) = lookup("XP_CERTIFICATE_ID") {
            self.signing.certificate_id = v;
        }
        if let Some(v) = lookup("XP_STORE_LOCATION") {
            self.signing.store_location = v.parse()?;
        }
        if let Some(v) = lookup("XP_STORE_NAME") {
            self.signing.store_name = v.parse()?;
        }
        if let Some(v) = lookup("XP_SIGNATURE_ALGORITHM") {
            self.signing.algorithm = v;
        }
        if let Some(v) = lookup("XP_OVERRIDE_CERTIFICATE") {
            self.signing.override_certificate = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("XP_OVERRIDE_PRIVATE_KEY") {
            self.signing.override_private_key = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("XP_STORE_ROOT") {
            self.store.root = PathBuf::from(v);
        }
        if let Some(v) = lookup("XP_TRUSTED_THUMBPRINTS") {
            self.trust.thumbprints = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = lookup("XP_TRUST_LOAD_STORE") {
            self.trust.load_store = parse_bool("XP_TRUST_LOAD_STORE", &v)?;
        }
        if let Some(v) = lookup("XP_ENFORCE_VALIDITY_WINDOW") {
            self.reader.enforce_validity_window = parse_bool("XP_ENFORCE_VALIDITY_WINDOW", &v)?;
        }
        if let Some(v) = lookup("XP_VERIFY_ASSERTION_SIGNATURE") {
            self.reader.verify_assertion_signature =
                parse_bool("XP_VERIFY_ASSERTION_SIGNATURE", &v)?;
        }
        if let Some(v) = lookup("XP_ALLOW_SHA1") {
            self.reader.allow_sha1 = parse_bool("XP_ALLOW_SHA1", &v)?;
        }
        if let Some(v) = lookup("XP_LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if an override certificate is configured without its
    /// private key (or the reverse).
    pub fn validate(&self) -> Result<()> {
        match (
            &self.signing.override_certificate,
            &self.signing.override_private_key,
        ) {
            (Some(_), None) => Err(Error::Validation(
                "override_certificate requires override_private_key".to_string(),
            )),
            (None, Some(_)) => Err(Error::Validation(
                "override_private_key requires override_certificate".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key}: expected a boolean, got '{value}'"))),
    }
}
