//! Configuration driven handler tests.

use std::io::Write;

use xp_core::Config;
use xp_protocol_saml::{SamlError, StoreScope, TokenHandler};

use crate::common::{fixture_root, payment_attributes, ROGUE_THUMBPRINT, SIGNING_THUMBPRINT};

fn write_config(body: &str) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(body.as_bytes())?;
    Ok(file)
}

/// A TOML file wires the store, the trust list and the algorithm.
#[test]
fn handler_from_toml_file() -> anyhow::Result<()> {
    let root = fixture_root();
    let file = write_config(&format!(
        r#"
[signing]
issuer = "Carrier"
subject = "test"
certificate_id = "{SIGNING_THUMBPRINT}"
algorithm = "rsa-sha1"

[store]
root = "{}"

[trust]
thumbprints = ["{}"]
load_store = false
"#,
        root.display(),
        SIGNING_THUMBPRINT.to_lowercase()
    ))?;

    let config = Config::load(file.path())?;
    let handler = TokenHandler::from_config(&config)?;
    assert_eq!(handler.reader().trust().len(), 1);

    let xml = handler.write(
        payment_attributes(),
        &config.signing.issuer,
        &config.signing.subject,
        &config.signing.certificate_id,
        StoreScope::new(config.signing.store_location, config.signing.store_name),
    )?;
    assert!(xml.contains("#rsa-sha1"));
    assert_eq!(handler.read(&xml)?["totalAmountPaid"], "99.99");
    Ok(())
}

/// Override credentials are used whatever thumbprint is requested.
#[test]
fn override_credentials_bypass_the_store() -> anyhow::Result<()> {
    let root = fixture_root();
    let mut config = Config::default();
    config.store.root = root.clone();
    config.signing.override_certificate = Some(root.join("current-user/my/rogue.crt"));
    config.signing.override_private_key = Some(root.join("current-user/my/rogue.key"));
    config.trust.thumbprints = vec![ROGUE_THUMBPRINT.to_string()];
    config.trust.load_store = false;

    let handler = TokenHandler::from_config(&config)?;
    let xml = handler.write(
        payment_attributes(),
        "Carrier",
        "test",
        "not-a-thumbprint",
        StoreScope::default(),
    )?;
    assert_eq!(handler.read(&xml)?["paymentStatus"], "Success");
    Ok(())
}

/// Environment overrides apply on top of file values.
#[test]
fn environment_overrides_file_values() -> anyhow::Result<()> {
    let file = write_config("[signing]\nissuer = \"Carrier\"\n")?;
    let mut config = Config::load(file.path())?;

    config.apply_env(|key| match key {
        "XP_SIGNING_ISSUER" => Some("Exchange".to_string()),
        "XP_STORE_ROOT" => Some(fixture_root().display().to_string()),
        "XP_ENFORCE_VALIDITY_WINDOW" => Some("true".to_string()),
        _ => None,
    })?;

    assert_eq!(config.signing.issuer, "Exchange");
    let handler = TokenHandler::from_config(&config)?;
    assert!(handler.reader().options().enforce_validity_window);
    Ok(())
}

/// `allow_sha1 = false` makes the configured reader refuse legacy tokens.
#[test]
fn sha1_can_be_disabled_from_configuration() -> anyhow::Result<()> {
    let file = write_config(&format!(
        r#"
[signing]
certificate_id = "{SIGNING_THUMBPRINT}"
algorithm = "rsa-sha1"

[store]
root = "{}"

[reader]
allow_sha1 = false
"#,
        fixture_root().display()
    ))?;

    let config = Config::load(file.path())?;
    let handler = TokenHandler::from_config(&config)?;
    assert!(!handler.reader().options().allow_sha1);

    let xml = handler.write(
        payment_attributes(),
        "Carrier",
        "test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
    )?;
    let err = handler.read(&xml).unwrap_err();
    assert!(err.is_integrity());
    Ok(())
}

/// An unknown algorithm name is refused when the handler is built.
#[test]
fn unknown_algorithm_is_refused() -> anyhow::Result<()> {
    let mut config = Config::default();
    config.store.root = fixture_root();
    config.signing.algorithm = "hmac-sha256".to_string();

    let err = TokenHandler::from_config(&config).unwrap_err();
    assert!(matches!(err, SamlError::UnsupportedAlgorithm(_)));
    Ok(())
}
