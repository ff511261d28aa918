//! Model to XML rendering.
//!
//! Converts assertions and responses into [`Element`] trees for signing and
//! renders finished trees with the canonicalizer, so the serialized bytes
//! are exactly the bytes the signatures cover.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{
    Assertion, NameId, Response, SAMLP_NS, SAMLP_PREFIX, SAML_NS, SAML_PREFIX,
};
use crate::xml::{canonicalize, Element};

fn saml(local_name: &str) -> Element {
    Element::qualified(SAML_PREFIX, SAML_NS, local_name)
}

fn samlp(local_name: &str) -> Element {
    Element::qualified(SAMLP_PREFIX, SAMLP_NS, local_name)
}

/// Formats a timestamp as `xs:dateTime` in UTC with millisecond precision.
#[must_use]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn name_id_element(local_name: &str, name_id: &NameId) -> Element {
    let mut element = saml(local_name);
    if let Some(format) = &name_id.format {
        element = element.with_attribute("Format", format.as_str());
    }
    element.with_text(name_id.value.as_str())
}

/// Builds the unsigned `<saml:Assertion>` element.
#[must_use]
pub fn assertion_element(assertion: &Assertion) -> Element {
    let subject = saml("Subject")
        .with_child(name_id_element("NameID", &assertion.subject.name_id))
        .with_child(
            saml("SubjectConfirmation")
                .with_attribute("Method", assertion.subject.confirmation.method.as_str()),
        );

    let conditions = saml("Conditions")
        .with_attribute("NotBefore", format_instant(assertion.conditions.not_before))
        .with_attribute(
            "NotOnOrAfter",
            format_instant(assertion.conditions.not_on_or_after),
        );

    let statement = assertion
        .attribute_statement
        .attributes
        .iter()
        .fold(saml("AttributeStatement"), |statement, attribute| {
            statement.with_child(
                saml("Attribute")
                    .with_attribute("Name", attribute.name.as_str())
                    .with_attribute("NameFormat", attribute.name_format.as_str())
                    .with_child(saml("AttributeValue").with_text(attribute.value.as_str())),
            )
        });

    let mut element = saml("Assertion")
        .with_attribute("ID", assertion.id.as_str())
        .with_attribute("IssueInstant", format_instant(assertion.issue_instant))
        .with_attribute("Version", assertion.version.as_str())
        .with_child(name_id_element("Issuer", &assertion.issuer))
        .with_child(subject)
        .with_child(conditions);

    // A statement without attributes is not schema valid.
    if !assertion.attribute_statement.attributes.is_empty() {
        element = element.with_child(statement);
    }
    element
}

/// Builds the unsigned `<samlp:Response>` element around its signed
/// assertion.
#[must_use]
pub fn response_element(response: &Response) -> Element {
    let mut status = samlp("Status").with_child(
        samlp("StatusCode").with_attribute("Value", response.status.status_code.as_str()),
    );
    if let Some(message) = &response.status.status_message {
        status = status.with_child(samlp("StatusMessage").with_text(message.as_str()));
    }

    samlp("Response")
        .with_attribute("ID", response.id.as_str())
        .with_attribute("IssueInstant", format_instant(response.issue_instant))
        .with_attribute("Version", response.version.as_str())
        .with_child(saml("Issuer").with_text(response.issuer.as_str()))
        .with_child(status)
        .with_child(response.assertion.clone())
}

/// Renders a finished element as an XML fragment without a declaration.
#[must_use]
pub fn serialize(element: &Element) -> String {
    canonicalize(element, None)
}
