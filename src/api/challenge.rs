use serde::{Deserialize, Serialize};

use crate::{api, error::Error};

/// A challenge offered by the provider inside an authorization.
///
/// # Example JSON
///
/// ```json
/// {
///   "type": "http-01",
///   "status": "pending",
///   "uri": "https://example.com/acme/challenge/YTqpYUthlVfwBncUufE8IRA2TkzZkN4eYWWLMSRqcSs/216789597",
///   "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Type of challenge encoded in the object, e.g. `http-01`.
    #[serde(rename = "type")]
    pub _type: String,

    /// URI the signed trigger is posted to, also polled for the result.
    #[serde(default)]
    pub uri: String,

    /// Status of this challenge.
    #[serde(default)]
    pub status: api::Status,

    /// Opaque value the proof material is derived from.
    #[serde(default)]
    pub token: String,

    /// Error that occurred while the provider was validating the challenge,
    /// if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<api::Problem>,
}

impl Challenge {
    /// Rejects tokens outside `[A-Za-z0-9_-]`.
    ///
    /// The token names a file under the web root in the http-01 flow, so
    /// anything that could traverse paths or smuggle header characters is
    /// refused before it reaches an authenticator. The empty token is
    /// refused for the same reason.
    pub fn validate_token(&self) -> Result<&str, Error> {
        let valid = !self.token.is_empty()
            && self
                .token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        if !valid {
            return Err(Error::InvalidToken(self.token.clone()));
        }

        Ok(&self.token)
    }
}

/// Signed body posted to a challenge URI to start remote validation.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerChallenge {
    pub resource: &'static str,

    #[serde(rename = "type")]
    pub _type: String,

    #[serde(rename = "keyAuthorization")]
    pub key_authorization: String,
}

impl TriggerChallenge {
    pub(crate) fn new(challenge: &Challenge, key_authorization: &str) -> Self {
        Self {
            resource: "challenge",
            _type: challenge._type.clone(),
            key_authorization: key_authorization.to_owned(),
        }
    }
}
