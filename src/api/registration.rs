use serde::Serialize;

/// Signed body posted to the `new-reg` resource.
///
/// # Example JSON
///
/// ```json
/// {
///   "resource": "new-reg",
///   "contact": ["mailto:cert-admin@example.com"],
///   "agreement": "https://letsencrypt.org/documents/LE-SA.pdf"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistration {
    pub resource: &'static str,
    pub contact: Vec<String>,
    pub agreement: String,
}

impl NewRegistration {
    pub(crate) fn new(contact: &[String], agreement: &str) -> Self {
        Self {
            resource: "new-reg",
            contact: contact.to_vec(),
            agreement: agreement.to_owned(),
        }
    }
}

/// Builds a `mailto:` contact entry for registration.
pub fn mail_contact(address: &str) -> String {
    format!("mailto:{address}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_contact() {
        assert_eq!(mail_contact("foo@bar.com"), "mailto:foo@bar.com");
    }

    #[test]
    fn test_new_registration_serializes_resource() {
        let reg = NewRegistration::new(&[mail_contact("foo@bar.com")], "https://tos.example");
        let json = serde_json::to_string(&reg).unwrap();
        assert!(json.starts_with(r#"{"resource":"new-reg""#));
    }
}
