use serde::{Deserialize, Serialize};

use crate::api;

/// Signed body posted to the `new-authz` resource.
#[derive(Debug, Clone, Serialize)]
pub struct NewAuthorization {
    pub resource: &'static str,
    pub identifier: api::Identifier,
}

impl NewAuthorization {
    pub(crate) fn new(identifier: &api::Identifier) -> Self {
        Self {
            resource: "new-authz",
            identifier: identifier.clone(),
        }
    }
}

/// An authorization as returned by `new-authz`.
///
/// The provider offers a set of challenges plus `combinations`, index sets
/// into `challenges` of which exactly one set has to be satisfied in full.
///
/// # Example JSON
///
/// ```json
/// {
///   "identifier": { "type": "dns", "value": "example.com" },
///   "status": "pending",
///   "challenges": [
///     { "type": "http-01", "status": "pending", "uri": "https://...", "token": "MUi-gqeO..." },
///     { "type": "dns-01", "status": "pending", "uri": "https://...", "token": "RRo2ZcXA..." }
///   ],
///   "combinations": [[0], [1]]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub identifier: Option<api::Identifier>,

    #[serde(default)]
    pub status: api::Status,

    #[serde(default)]
    pub challenges: Vec<api::Challenge>,

    /// Absent on some providers; an empty list here means each challenge
    /// stands alone (see [`Authorization::combinations`]).
    #[serde(default)]
    pub combinations: Vec<Vec<usize>>,
}

impl Authorization {
    /// The combinations to scan, substituting one singleton combination per
    /// challenge when the provider sent none.
    pub fn combinations(&self) -> Vec<Vec<usize>> {
        if !self.combinations.is_empty() {
            return self.combinations.clone();
        }

        (0..self.challenges.len()).map(|idx| vec![idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_fallback_to_singletons() {
        let authz = serde_json::from_str::<Authorization>(
            r#"{
                "status": "pending",
                "challenges": [
                    {"type": "http-01", "uri": "u1", "token": "t1"},
                    {"type": "dns-01", "uri": "u2", "token": "t2"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(authz.combinations(), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_combinations_passed_through() {
        let authz = serde_json::from_str::<Authorization>(
            r#"{
                "status": "pending",
                "challenges": [{"type": "http-01", "uri": "u", "token": "t"}],
                "combinations": [[0]]
            }"#,
        )
        .unwrap();

        assert_eq!(authz.combinations(), vec![vec![0]]);
    }
}
