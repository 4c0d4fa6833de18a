//! Authorization orchestration.
//!
//! One authorization covers one identifier: request it, pick a satisfiable
//! challenge combination, publish proof material, trigger remote
//! validation and poll the authorization until the provider settles.

use std::thread;

use crate::{
    api,
    challenge::{AuthenticatorRegistry, CleanupGuard},
    dir,
    error::{Error, ProtocolError, Result},
    session::Session,
};

impl Session {
    /// Authorizes every identifier in order, stopping at the first
    /// failure. Identifiers authorized before the failure stay authorized
    /// on the provider side.
    pub fn authorize_all(&self, identifiers: &[api::Identifier]) -> Result<()> {
        for identifier in identifiers {
            self.authorize(identifier)?;
        }
        Ok(())
    }

    /// Proves control over one identifier.
    ///
    /// Scans the provider's challenge combinations for the first one the
    /// registered authenticators can satisfy in full, completes its
    /// challenges in the order the combination lists them, then polls the
    /// authorization until the provider settles. Published proof material
    /// is removed on every exit path, including failures.
    pub fn authorize(&self, identifier: &api::Identifier) -> Result<()> {
        log::info!("authorize {}", identifier.value);

        let (authorization, authorization_url) = self.new_authorization(identifier)?;

        if authorization.status == api::Status::Valid {
            log::info!("{} is already authorized", identifier.value);
            return Ok(());
        }

        let selected = select_challenges(&authorization, self.authenticators());
        if selected.is_empty() {
            return Err(Error::NoUsableChallenge);
        }

        let account_key = self.transport().account_key();

        // guards drop at the end of this scope, after the wait, success or
        // not
        let mut proofs = Vec::with_capacity(selected.len());

        for challenge in selected {
            let token = challenge.validate_token()?;
            let key_authorization = account_key.key_authorization(token);

            // selection guarantees the authenticator exists
            let authenticator = self
                .authenticators()
                .get(&challenge._type)
                .ok_or(Error::NoUsableChallenge)?;

            let handle = authenticator.prepare(account_key, challenge, &key_authorization)?;
            proofs.push(CleanupGuard::new(handle));

            let trigger = api::TriggerChallenge::new(challenge, &key_authorization);

            log::debug!("trigger {} challenge at {}", challenge._type, challenge.uri);
            let res = self.transport().call(&challenge.uri, &trigger)?;

            if !matches!(res.status, 200 | 202) {
                return Err(ProtocolError::from_response("challenge trigger rejected", &res).into());
            }
        }

        self.wait_authorization_done(&authorization_url)
    }

    /// Requests a fresh authorization for one identifier, returning the
    /// offered challenges and the authorization URL to poll.
    fn new_authorization(&self, identifier: &api::Identifier) -> Result<(api::Authorization, String)> {
        let payload = api::NewAuthorization::new(identifier);

        let url = self.directory().url_for(dir::NEW_AUTHZ)?;
        let res = self.transport().call(url, &payload)?;

        if res.status != 201 {
            return Err(ProtocolError::from_response("authorization rejected", &res).into());
        }

        let location = res
            .headers
            .get("location")
            .ok_or_else(|| ProtocolError::new("authorization response carries no Location header"))?
            .to_owned();

        Ok((serde_json::from_slice(&res.body)?, location))
    }

    /// Polls an authorization URL until the provider reports a terminal
    /// status or the poll budget runs out.
    fn wait_authorization_done(&self, url: &str) -> Result<()> {
        let config = self.config();

        for attempt in 1..=config.max_poll_attempts {
            let res = self.transport().poll_get(url)?;

            if !matches!(res.status, 200 | 202) {
                return Err(ProtocolError::from_response("authorization poll failed", &res).into());
            }

            let authorization: api::Authorization = serde_json::from_slice(&res.body)?;

            match authorization.status {
                api::Status::Valid => {
                    log::info!("authorization validated");
                    return Ok(());
                }

                api::Status::Pending | api::Status::Processing => {
                    log::debug!("authorization still pending (attempt {attempt})");

                    if attempt < config.max_poll_attempts {
                        let delay = res.headers.retry_after().unwrap_or(config.poll_interval);
                        thread::sleep(delay);
                    }
                }

                _ => {
                    // surface the failed challenge's own error when the
                    // provider recorded one
                    let problem = authorization
                        .challenges
                        .iter()
                        .find_map(|challenge| challenge.error.clone());

                    return Err(ProtocolError {
                        message: "authorization failed".to_owned(),
                        problem,
                    }
                    .into());
                }
            }
        }

        Err(Error::Timeout {
            attempts: config.max_poll_attempts,
        })
    }
}

/// Picks the challenges of the first combination the registry can satisfy
/// in full, preserving the combination's order.
///
/// A combination referencing an index outside the challenge list cannot be
/// satisfied and is skipped. An empty return means no combination matched.
fn select_challenges<'a>(
    authorization: &'a api::Authorization,
    registry: &AuthenticatorRegistry,
) -> Vec<&'a api::Challenge> {
    for combination in authorization.combinations() {
        let challenges: Option<Vec<&api::Challenge>> = combination
            .iter()
            .map(|&idx| {
                authorization
                    .challenges
                    .get(idx)
                    .filter(|challenge| registry.supports(&challenge._type))
            })
            .collect();

        if let Some(challenges) = challenges {
            return challenges;
        }
    }

    Vec::new()
}
