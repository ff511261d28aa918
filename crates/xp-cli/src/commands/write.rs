//! Token writing command.

use tracing::debug;
use xp_core::Config;
use xp_protocol_saml::bindings::encode_post_message;
use xp_protocol_saml::signature::{SignatureAlgorithm, SignatureConfig};
use xp_protocol_saml::{StoreScope, TokenHandler};

use super::split_pair;
use crate::cli::WriteArgs;
use crate::output::{success, warning};

/// Runs the write command.
pub fn run_write(args: WriteArgs, config: &Config) -> crate::CliResult<()> {
    let attributes = args
        .attributes
        .iter()
        .map(|arg| split_pair(arg))
        .collect::<crate::CliResult<Vec<_>>>()?;
    if attributes.is_empty() {
        warning("no attributes given; the assertion will carry no attribute statement");
    }

    let mut handler = TokenHandler::from_config(config)?;
    if args.legacy_sha1 {
        handler = handler
            .with_signature_config(SignatureConfig::with_algorithm(SignatureAlgorithm::RsaSha1));
    }

    let signing = &config.signing;
    let scope = StoreScope::new(
        args.store_location.unwrap_or(signing.store_location),
        args.store_name.unwrap_or(signing.store_name),
    );
    let certificate_id = args
        .certificate_id
        .as_deref()
        .unwrap_or(&signing.certificate_id);

    debug!(attributes = attributes.len(), store = %scope, "writing token");
    let xml = handler.write(
        attributes,
        args.issuer.as_deref().unwrap_or(&signing.issuer),
        args.subject.as_deref().unwrap_or(&signing.subject),
        certificate_id,
        scope,
    )?;

    if args.base64 {
        println!("{}", encode_post_message(&xml));
    } else {
        println!("{xml}");
    }
    success(&format!(
        "signed with {} from {scope}",
        handler.signature_config().algorithm.uri()
    ));
    Ok(())
}
