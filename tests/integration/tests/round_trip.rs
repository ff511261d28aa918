//! Write-then-read tests.
//!
//! Tokens written by one portal must be readable by the other with the
//! claims intact.

use chrono::{Duration, Utc};
use xp_protocol_saml::bindings::{decode_post_message, encode_post_message};
use xp_protocol_saml::claims::attribute_names::*;
use xp_protocol_saml::signature::{SignatureAlgorithm, SignatureConfig};
use xp_protocol_saml::{ClaimProfile, ReaderOptions, SamlError, StoreScope};

use crate::common::{handler, payment_token, SIGNING_THUMBPRINT};

fn enrollment_attributes(middle_name: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        (FIRST_NAME, "Jane"),
        (MIDDLE_NAME, middle_name),
        (LAST_NAME, "Doe"),
        (STREET_NAME_1, "1 Main St"),
        (STREET_NAME_2, "Apt 2"),
        (CITY, "Springfield"),
        (STATE, "IL"),
        (ZIP_CODE, "62701"),
        (CONTACT_EMAIL, "jane@example.com"),
        (TOTAL_AMOUNT_OWED, "250.00"),
        (RETURN_URL, "https://exchange.example/Home/Index?plan=7&tier=gold"),
    ]
}

/// The carrier's payment result reads back as the three payment claims.
#[test]
fn payment_claims_round_trip() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;

    let claims = handler.read(&xml)?;
    assert_eq!(claims.len(), 3);
    assert_eq!(claims["paymentTransactionID"], "abc-123");
    assert_eq!(claims["totalAmountPaid"], "99.99");
    assert_eq!(claims["paymentStatus"], "Success");
    Ok(())
}

/// The written document is a signed response around a signed assertion.
#[test]
fn response_layout() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;

    assert!(xml.starts_with("<samlp:Response "));
    assert!(!xml.starts_with("<?xml"));
    assert_eq!(xml.matches("<ds:Signature ").count(), 2);
    assert!(xml.contains("<saml:Issuer xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\">Carrier</saml:Issuer><ds:Signature"));
    assert!(xml.contains("urn:oasis:names:tc:SAML:2.0:status:Success"));
    assert!(xml.contains("<saml:NameID Format=\"urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified\">test</saml:NameID>"));
    assert!(xml.contains("urn:oasis:names:tc:SAML:2.0:cm:sender-vouches"));
    assert!(xml.contains("http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"));
    assert!(xml.contains("http://www.w3.org/2001/04/xmlenc#sha256"));
    Ok(())
}

/// The exchange's enrollment hand-off reads back with the carrier profile.
#[test]
fn enrollment_claims_round_trip() -> anyhow::Result<()> {
    let handler = handler()?.with_profile(ClaimProfile::carrier_enrollment());
    let xml = handler.write(
        enrollment_attributes("Q"),
        "Exchange",
        "Test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
    )?;

    let claims = handler.read(&xml)?;
    assert_eq!(claims.len(), 11);
    assert_eq!(claims["firstName"], "Jane");
    assert_eq!(claims["middleName"], "Q");
    assert_eq!(claims["address1"], "1 Main St");
    assert_eq!(claims["zip"], "62701");
    assert_eq!(claims["amountOwed"], "250.00");
    assert_eq!(
        claims["redirectUrl"],
        "https://exchange.example/Home/Index?plan=7&tier=gold"
    );
    Ok(())
}

/// Empty values are left out, so a profile requiring them fails to read.
#[test]
fn empty_values_are_omitted() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = handler.write(
        enrollment_attributes(""),
        "Exchange",
        "Test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
    )?;
    assert!(!xml.contains(MIDDLE_NAME));

    let err = handler
        .read_with(&xml, &ClaimProfile::carrier_enrollment())
        .unwrap_err();
    assert!(matches!(&err, SamlError::MissingClaim(name) if name == MIDDLE_NAME));
    assert!(err.is_parse());

    let claims = handler.read_with(&xml, &ClaimProfile::custom([(FIRST_NAME, "first")]))?;
    assert_eq!(claims["first"], "Jane");
    Ok(())
}

/// A repeated attribute name keeps only its last value.
#[test]
fn repeated_attribute_keeps_last_value() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = handler.write(
        [
            (PAYMENT_TRANSACTION_ID, "first"),
            (TOTAL_AMOUNT_PAID, "1.00"),
            (PAYMENT_STATUS, "Success"),
            (PAYMENT_TRANSACTION_ID, "second"),
        ],
        "Carrier",
        "test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
    )?;

    assert_eq!(xml.matches(PAYMENT_TRANSACTION_ID).count(), 1);
    assert_eq!(handler.read(&xml)?["paymentTransactionID"], "second");
    Ok(())
}

/// RSA-SHA1 tokens are still accepted by default and can be refused.
#[test]
fn legacy_sha1_signatures() -> anyhow::Result<()> {
    let handler = handler()?
        .with_signature_config(SignatureConfig::with_algorithm(SignatureAlgorithm::RsaSha1));
    let xml = payment_token(&handler)?;

    assert!(xml.contains("http://www.w3.org/2000/09/xmldsig#rsa-sha1"));
    assert!(xml.contains("http://www.w3.org/2000/09/xmldsig#sha1"));
    assert_eq!(handler.read(&xml)?["paymentStatus"], "Success");

    let strict = handler.reader().clone().with_options(ReaderOptions {
        allow_sha1: false,
        ..ReaderOptions::default()
    });
    let err = strict.read(&xml, &ClaimProfile::payment()).unwrap_err();
    assert!(err.is_integrity());
    Ok(())
}

/// Tokens survive the `SAMLResponse` form encoding.
#[test]
fn post_binding_round_trip() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;

    let form_value = encode_post_message(&xml);
    let decoded = decode_post_message(&form_value)?;
    assert_eq!(decoded, xml);
    assert_eq!(handler.read(&decoded)?["paymentTransactionID"], "abc-123");
    Ok(())
}

/// The validity window is only checked when asked for.
#[test]
fn validity_window_enforcement() -> anyhow::Result<()> {
    let handler = handler()?;
    let issued = Utc::now();
    let xml = handler.write_at(
        crate::common::payment_attributes(),
        "Carrier",
        "test",
        SIGNING_THUMBPRINT,
        StoreScope::default(),
        issued,
    )?;
    let profile = ClaimProfile::payment();
    let strict = handler.reader().clone().with_options(ReaderOptions {
        enforce_validity_window: true,
        ..ReaderOptions::default()
    });

    assert!(strict.read_at(&xml, &profile, issued + Duration::minutes(4)).is_ok());
    assert!(strict.read_at(&xml, &profile, issued - Duration::minutes(1)).is_ok());

    let err = strict
        .read_at(&xml, &profile, issued + Duration::minutes(5))
        .unwrap_err();
    assert!(matches!(err, SamlError::AssertionExpired));

    let err = strict
        .read_at(&xml, &profile, issued - Duration::minutes(3))
        .unwrap_err();
    assert!(matches!(err, SamlError::AssertionNotYetValid));

    assert!(handler
        .reader()
        .read_at(&xml, &profile, issued + Duration::days(1))
        .is_ok());
    Ok(())
}

/// The inner assertion signature verifies on its own.
#[test]
fn assertion_signature_verifies() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;
    let reader = handler.reader().clone().with_options(ReaderOptions {
        verify_assertion_signature: true,
        ..ReaderOptions::default()
    });
    assert_eq!(
        reader.read(&xml, &ClaimProfile::payment())?["paymentStatus"],
        "Success"
    );
    Ok(())
}
