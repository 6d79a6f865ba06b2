//! Forms value objects
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::Certificate;

/// Template variables every relay template expects.
pub const TEMPLATE_VARIABLES: [&str; 3] = ["contact_form_name", "contact_form_email", "content"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType { ShortText, LongText, Email }

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub field_type: FieldType,
    pub label: String,
    pub required: bool,
}

impl FormField {
    pub fn required(name: &str, field_type: FieldType, label: &str) -> Self {
        Self { name: name.into(), field_type, label: label.into(), required: true }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind { Contact, CertificateRequest }

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::Contact => write!(f, "contact"),
            FormKind::CertificateRequest => write!(f, "certificate-request"),
        }
    }
}

impl FormKind {
    /// Text of the success notice.
    pub fn confirmation(&self) -> &'static str {
        match self {
            FormKind::Contact => "Message sent successfully! We'll get back to you soon.",
            FormKind::CertificateRequest => "Request sent successfully! We'll get back soon.",
        }
    }
}

/// Why a relay call did not go through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind { NetworkFailure, RelayRejected, Timeout }

/// Static context mixed into the payload next to the typed fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestContext {
    /// `content` comes from the `message` field.
    Message,
    /// `content` names the requested certificate.
    Certificate { name: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub template_id: String,
    pub context: RequestContext,
}

impl FormTemplate {
    /// Builds the relay request from the current field values.
    pub fn build_request(&self, fields: &BTreeMap<String, String>) -> SubmissionRequest {
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
        let content = match &self.context {
            RequestContext::Message => field("message"),
            RequestContext::Certificate { name } => format!("Requesting certificate: {name}"),
        };

        let mut payload = BTreeMap::new();
        payload.insert("contact_form_name".to_string(), field("name"));
        payload.insert("contact_form_email".to_string(), field("email"));
        payload.insert("content".to_string(), content);

        debug_assert!(
            TEMPLATE_VARIABLES.iter().all(|v| payload.contains_key(*v)),
            "payload is missing a template variable"
        );

        SubmissionRequest { template_id: self.template_id.clone(), payload }
    }
}

/// Everything a mounted form needs to know about itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub template: FormTemplate,
    /// Address offered when the relay fails.
    pub fallback_contact: String,
}

impl FormDefinition {
    pub fn contact(template_id: impl Into<String>, fallback_contact: impl Into<String>) -> Self {
        Self {
            kind: FormKind::Contact,
            fields: vec![
                FormField::required("name", FieldType::ShortText, "Name"),
                FormField::required("email", FieldType::Email, "Email"),
                FormField::required("message", FieldType::LongText, "Message"),
            ],
            template: FormTemplate { template_id: template_id.into(), context: RequestContext::Message },
            fallback_contact: fallback_contact.into(),
        }
    }

    pub fn certificate_request(
        template_id: impl Into<String>,
        fallback_contact: impl Into<String>,
        certificate: &Certificate,
    ) -> Self {
        Self {
            kind: FormKind::CertificateRequest,
            fields: vec![
                FormField::required("name", FieldType::ShortText, "Name"),
                FormField::required("email", FieldType::Email, "Email"),
            ],
            template: FormTemplate {
                template_id: template_id.into(),
                context: RequestContext::Certificate { name: certificate.name.to_string() },
            },
            fallback_contact: fallback_contact.into(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub template_id: String,
    pub payload: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_contact_payload() {
        let def = FormDefinition::contact("template_contact", "owner@example.com");
        let req = def.template.build_request(&fields(&[("name", "Ada"), ("email", "ada@x.com"), ("message", "hello")]));
        assert_eq!(req.template_id, "template_contact");
        assert_eq!(req.payload["contact_form_name"], "Ada");
        assert_eq!(req.payload["contact_form_email"], "ada@x.com");
        assert_eq!(req.payload["content"], "hello");
    }

    #[test]
    fn test_certificate_payload() {
        let cert = catalog::find("devops-ibm-2023").unwrap();
        let def = FormDefinition::certificate_request("template_cert", "owner@example.com", cert);
        let req = def.template.build_request(&fields(&[("name", "Ada"), ("email", "ada@x.com")]));
        assert_eq!(req.payload.len(), TEMPLATE_VARIABLES.len());
        assert_eq!(
            req.payload["content"],
            "Requesting certificate: IBM Applied DevOps Engineering Professional Certificate"
        );
        assert!(def.field("message").is_none());
    }
}
