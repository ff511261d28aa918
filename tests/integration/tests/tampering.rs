//! Rejection tests.
//!
//! Each test alters a valid token or signs with the wrong certificate and
//! checks the reader fails with the expected error category.

use std::collections::HashMap;

use xp_crypto::Certificate;
use xp_protocol_saml::{ErrorKind, SamlError, StoreScope};

use crate::common::{
    fixture_root, handler, payment_attributes, payment_token, rogue_scope, ROGUE_THUMBPRINT,
};

fn trusted_certificate_b64() -> anyhow::Result<String> {
    let pem = std::fs::read_to_string(
        fixture_root().join("local-machine/trusted-people/exchange-signing.crt"),
    )?;
    Ok(Certificate::from_pem(&pem)?.to_base64())
}

/// Changing a signed value breaks the response digest.
#[test]
fn altered_attribute_value_is_an_integrity_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?.replace("99.99", "0.01");

    let err = handler.read(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(err.http_status(), 401);
    Ok(())
}

/// A corrupted signature value does not verify.
#[test]
fn altered_signature_value_is_an_integrity_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;
    let start = xml.find("<ds:SignatureValue>").expect("signature value") + 19;
    let mut bytes = xml.into_bytes();
    bytes[start] = if bytes[start] == b'A' { b'B' } else { b'A' };
    let xml = String::from_utf8(bytes)?;

    assert!(handler.read(&xml).unwrap_err().is_integrity());
    Ok(())
}

/// A token signed by a certificate outside the trust store is refused
/// before its signature is looked at.
#[test]
fn untrusted_signer_is_a_trust_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = handler.write(
        payment_attributes(),
        "Carrier",
        "test",
        ROGUE_THUMBPRINT,
        rogue_scope(),
    )?;

    let err = handler.read(&xml).unwrap_err();
    assert!(matches!(&err, SamlError::UntrustedCertificate(t) if t == ROGUE_THUMBPRINT));
    assert_eq!(err.kind(), ErrorKind::Trust);
    Ok(())
}

/// Swapping in the trusted certificate does not make a rogue signature
/// verify.
#[test]
fn substituted_certificate_is_an_integrity_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = handler.write(
        payment_attributes(),
        "Carrier",
        "test",
        ROGUE_THUMBPRINT,
        rogue_scope(),
    )?;

    let start = xml.find("<ds:X509Certificate>").expect("certificate") + 20;
    let end = start + xml[start..].find("</ds:X509Certificate>").expect("end");
    let forged = format!("{}{}{}", &xml[..start], trusted_certificate_b64()?, &xml[end..]);

    assert!(handler.read(&forged).unwrap_err().is_integrity());
    Ok(())
}

/// An extra assertion placed ahead of the signed one is detected.
#[test]
fn injected_assertion_is_an_integrity_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;

    let forged_assertion = concat!(
        "<saml:Assertion xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\" ID=\"_forged\" Version=\"2.0\">",
        "<saml:AttributeStatement>",
        "<saml:Attribute Name=\"Payment Transaction ID\"><saml:AttributeValue>x</saml:AttributeValue></saml:Attribute>",
        "<saml:Attribute Name=\"Total Amount Paid\"><saml:AttributeValue>1000000</saml:AttributeValue></saml:Attribute>",
        "<saml:Attribute Name=\"Payment Status\"><saml:AttributeValue>Success</saml:AttributeValue></saml:Attribute>",
        "</saml:AttributeStatement></saml:Assertion>"
    );
    let at = xml.find("<saml:Assertion").expect("assertion");
    let forged = format!("{}{}{}", &xml[..at], forged_assertion, &xml[at..]);

    assert!(handler.read(&forged).unwrap_err().is_integrity());
    Ok(())
}

/// A signature whose reference points elsewhere is refused.
#[test]
fn retargeted_reference_is_an_integrity_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;
    let forged = xml.replacen(" ID=\"_id", " ID=\"_other", 1);

    let err = handler.read(&forged).unwrap_err();
    assert!(err.is_integrity());
    assert!(err.to_string().contains("does not point at"));
    Ok(())
}

/// Document type declarations are refused outright.
#[test]
fn doctype_is_a_parse_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = format!(
        "<!DOCTYPE samlp:Response [<!ENTITY x \"y\">]>{}",
        payment_token(&handler)?
    );

    let err = handler.read(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(err.http_status(), 400);
    Ok(())
}

/// Truncated or unsigned documents are parse errors.
#[test]
fn incomplete_documents_are_parse_errors() -> anyhow::Result<()> {
    let handler = handler()?;
    let xml = payment_token(&handler)?;

    assert!(handler.read(&xml[..xml.len() / 2]).unwrap_err().is_parse());
    assert!(handler.read("").unwrap_err().is_parse());

    let unsigned = "<samlp:Response xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\" ID=\"_1\" Version=\"2.0\"></samlp:Response>";
    let err = handler.read(unsigned).unwrap_err();
    assert!(matches!(&err, SamlError::MissingElement(name) if name == "ds:Signature"));
    Ok(())
}

/// No single-bit change anywhere in a signed token is accepted, and every
/// rejection falls in one of the reader's error categories.
#[test]
fn every_flipped_byte_is_rejected() -> anyhow::Result<()> {
    let handler = handler()?;
    let token = payment_token(&handler)?.into_bytes();
    let mut rejected: HashMap<ErrorKind, usize> = HashMap::new();

    for index in 0..token.len() {
        let mut bytes = token.clone();
        bytes[index] ^= 0x01;
        let kind = match String::from_utf8(bytes) {
            Ok(xml) => match handler.read(&xml) {
                Ok(claims) => panic!("byte {index} flipped and still accepted: {claims:?}"),
                Err(err) => err.kind(),
            },
            Err(_) => ErrorKind::Parse,
        };
        assert_ne!(kind, ErrorKind::Signing, "byte {index}");
        *rejected.entry(kind).or_default() += 1;
    }

    assert_eq!(rejected.values().sum::<usize>(), token.len());
    assert!(rejected.contains_key(&ErrorKind::Parse));
    assert!(rejected.contains_key(&ErrorKind::Trust));
    assert!(rejected.contains_key(&ErrorKind::Integrity));
    Ok(())
}

/// Signing with a certificate the store does not hold fails before any
/// XML is produced.
#[test]
fn unknown_signing_certificate_is_a_signing_error() -> anyhow::Result<()> {
    let handler = handler()?;
    let err = handler
        .write(
            payment_attributes(),
            "Carrier",
            "test",
            ROGUE_THUMBPRINT,
            StoreScope::default(),
        )
        .unwrap_err();

    assert!(matches!(err, SamlError::CertificateNotFound { .. }));
    assert_eq!(err.http_status(), 500);
    Ok(())
}
