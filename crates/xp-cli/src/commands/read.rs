//! Token reading command.

use std::io::Read;

use tracing::debug;
use xp_core::Config;
use xp_protocol_saml::bindings::decode_post_message;
use xp_protocol_saml::{ClaimProfile, TokenHandler};

use super::split_pair;
use crate::cli::ReadArgs;
use crate::config::OutputFormat;
use crate::error::CliError;
use crate::output::{output_fields, success, Field};

/// Runs the read command.
pub fn run_read(args: ReadArgs, config: &Config, format: OutputFormat) -> crate::CliResult<()> {
    let raw = match &args.input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let xml = if args.base64 {
        decode_post_message(&raw)?
    } else {
        raw
    };

    let profile = build_profile(&args)?;
    let handler = TokenHandler::from_config(config)?;
    let mut options = *handler.reader().options();
    if args.enforce_validity {
        options.enforce_validity_window = true;
    }
    let reader = handler.reader().clone().with_options(options);

    debug!(
        required = profile.len(),
        enforce_validity = options.enforce_validity_window,
        "reading token"
    );
    let claims = reader.read(xml.trim(), &profile)?;
    success(&format!("signature verified, {} claims extracted", claims.len()));

    let fields: Vec<Field> = claims
        .into_iter()
        .map(|(key, value)| Field::new(key, value))
        .collect();
    output_fields(&fields, format)
}

/// Chooses the claim profile.
///
/// `--claim` entries extend the named profile. With `--claim` alone only the
/// given claims are required; with neither the payment profile applies.
fn build_profile(args: &ReadArgs) -> crate::CliResult<ClaimProfile> {
    let base = match args.profile.as_deref() {
        Some(name) => ClaimProfile::from_name(name)
            .ok_or_else(|| CliError::InvalidArgument(format!("unknown profile: {name}")))?,
        None if args.claims.is_empty() => ClaimProfile::payment(),
        None => ClaimProfile::new(),
    };

    args.claims.iter().try_fold(base, |profile, arg| {
        let (attribute, key) = split_pair(arg)?;
        Ok(profile.claim(attribute, key))
    })
}
