//! Certificate thumbprint command.

use std::path::Path;

use xp_crypto::Certificate;

use crate::config::OutputFormat;
use crate::output::{output_fields, warning, Field};

/// Runs the thumbprint command.
pub fn run_thumbprint(cert: &Path, format: OutputFormat) -> crate::CliResult<()> {
    let bytes = std::fs::read(cert)?;
    let certificate = match String::from_utf8(bytes) {
        Ok(text) if text.contains("-----BEGIN") => Certificate::from_pem(&text)?,
        Ok(text) => Certificate::from_der(text.into_bytes())?,
        Err(e) => Certificate::from_der(e.into_bytes())?,
    };

    let now = chrono::Utc::now().timestamp();
    if !certificate.is_valid_at(now) {
        warning("certificate is outside its validity period");
    }

    output_fields(
        &[
            Field::new("thumbprint", certificate.thumbprint().as_str()),
            Field::new("subject", certificate.subject()),
        ],
        format,
    )
}
