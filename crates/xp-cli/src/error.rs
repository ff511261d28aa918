//! CLI error types.

use thiserror::Error;
use xp_protocol_saml::{ErrorKind, SamlError};

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Core(#[from] xp_core::Error),

    /// Token engine error.
    #[error("{}: {}", kind_label(.0.kind()), .0)]
    Saml(#[from] SamlError),

    /// Certificate could not be decoded.
    #[error("certificate error: {0}")]
    Certificate(#[from] xp_crypto::CertificateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

const fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Parse => "parse error",
        ErrorKind::Trust => "trust error",
        ErrorKind::Integrity => "integrity error",
        ErrorKind::Signing => "signing error",
    }
}

impl CliError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Saml(e) => match e.kind() {
                ErrorKind::Parse => 3,
                ErrorKind::Trust => 4,
                ErrorKind::Integrity => 5,
                ErrorKind::Signing => 6,
            },
            Self::InvalidArgument(_) => 2,
            _ => 1,
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_carry_their_category() {
        let err = CliError::from(SamlError::SignatureInvalid("digest mismatch".to_string()));
        assert!(err.to_string().starts_with("integrity error: "));
        assert_eq!(err.exit_code(), 5);

        let err = CliError::from(SamlError::UntrustedCertificate("AB".to_string()));
        assert_eq!(err.exit_code(), 4);
    }
}
