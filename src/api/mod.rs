//! JSON wire payloads of the ACME v1 protocol.
//!
//! Not intended to be used directly. Provided to aid debugging.

use std::fmt;

use serde::{Deserialize, Serialize};

mod authorization;
mod certificate;
mod challenge;
mod identifier;
mod registration;
mod revocation;

pub use self::{
    authorization::{Authorization, NewAuthorization},
    certificate::NewCertificate,
    challenge::{Challenge, TriggerChallenge},
    identifier::Identifier,
    registration::{mail_contact, NewRegistration},
    revocation::Revocation,
};

/// Resource state reported by the provider for authorizations and
/// challenges.
///
/// Only `pending` keeps a polling loop going; everything else is terminal
/// for the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Processing,
    Valid,
    Invalid,
    Revoked,
    #[serde(other)]
    Unknown,
}

/// Problem document sent by the provider on failed requests.
///
/// # Example JSON
///
/// ```json
/// {
///   "type": "urn:acme:error:malformed",
///   "detail": "JWS verification error",
///   "status": 400
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type", default)]
    pub _type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl Problem {
    /// Best-effort parse of a response body as a problem document.
    ///
    /// Providers are not obliged to send one, and some send non-JSON error
    /// pages, so a body that does not parse yields `None` rather than an
    /// error of its own.
    pub(crate) fn from_body(body: &[u8]) -> Option<Problem> {
        let problem = serde_json::from_slice::<Problem>(body).ok()?;

        if problem._type.is_empty() && problem.detail.is_none() {
            return None;
        }

        Some(problem)
    }

    /// Returns true if the problem type is "badNonce".
    pub fn is_bad_nonce(&self) -> bool {
        self._type.ends_with(":badNonce")
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self._type),
            None => write!(f, "{}", self._type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_from_body() {
        let body = br#"{"type":"urn:acme:error:unauthorized","detail":"nope","status":403}"#;
        let problem = Problem::from_body(body).unwrap();
        assert_eq!(problem._type, "urn:acme:error:unauthorized");
        assert_eq!(problem.detail.as_deref(), Some("nope"));
        assert_eq!(problem.status, Some(403));
    }

    #[test]
    fn test_problem_from_garbage_body() {
        assert_eq!(Problem::from_body(b"<html>oops</html>"), None);
        assert_eq!(Problem::from_body(b"{}"), None);
    }

    #[test]
    fn test_bad_nonce_detection() {
        let problem = Problem {
            _type: "urn:acme:error:badNonce".to_owned(),
            ..Problem::default()
        };
        assert!(problem.is_bad_nonce());
        assert!(!Problem::default().is_bad_nonce());
    }

    #[test]
    fn test_status_unknown_fallback() {
        let status = serde_json::from_str::<Status>("\"deactivated\"").unwrap();
        assert_eq!(status, Status::Unknown);
    }
}
