//! Signed request plumbing and nonce bookkeeping.
//!
//! One [`Transport`] belongs to one session. Every signed call consumes
//! the single tracked nonce and must complete, response observed, before
//! the next signed call starts; the slot's mutex is held across the whole
//! round trip to enforce that ordering.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::{
    api,
    error::{Error, Result},
    http::{Headers, HttpResponse, HttpTransport},
    jws,
    key::AccountKey,
};

/// Holds the single freshest anti-replay token.
#[derive(Debug, Default)]
struct NonceSlot(Mutex<Option<String>>);

impl NonceSlot {
    /// Overwrites the slot from a response's `Replay-Nonce` header. A
    /// response without one keeps the prior value; the next signed call
    /// then risks a badNonce rejection, which is worth a warning.
    fn observe(&self, headers: &Headers) {
        let mut slot = self.0.lock();
        Self::observe_locked(&mut slot, headers);
    }

    fn observe_locked(slot: &mut Option<String>, headers: &Headers) {
        match headers.get("replay-nonce") {
            Some(nonce) => {
                log::trace!("keep nonce: {nonce}");
                *slot = Some(nonce.to_owned());
            }
            None => log::warn!("server did not provide a replay nonce"),
        }
    }
}

/// JWS payload and nonce handling for requests to the API.
pub(crate) struct Transport {
    http: Arc<dyn HttpTransport>,
    account_key: AccountKey,
    nonce: NonceSlot,
}

impl Transport {
    pub(crate) fn new(http: Arc<dyn HttpTransport>, account_key: AccountKey) -> Transport {
        Transport {
            http,
            account_key,
            nonce: NonceSlot::default(),
        }
    }

    /// The account key used in the transport.
    pub(crate) fn account_key(&self) -> &AccountKey {
        &self.account_key
    }

    /// Plain GET that still harvests the response nonce. Used for the
    /// directory fetch that seeds the slot.
    pub(crate) fn get(&self, url: &str) -> Result<HttpResponse> {
        log::debug!("GET {url}");
        let res = self.http.get(url, &[])?;
        self.nonce.observe(&res.headers);
        Ok(res)
    }

    /// Unsigned polling GET carrying the current nonce as a header, the
    /// way the v1 providers expect during authorization and issuance
    /// polling.
    pub(crate) fn poll_get(&self, url: &str) -> Result<HttpResponse> {
        let mut slot = self.nonce.0.lock();

        log::debug!("poll {url}");
        let res = match slot.as_deref() {
            Some(nonce) => self.http.get(url, &[("Nonce", nonce)])?,
            None => self.http.get(url, &[])?,
        };

        NonceSlot::observe_locked(&mut slot, &res.headers);
        Ok(res)
    }

    /// Signed POST. The current nonce is embedded in the protected header
    /// and the response's nonce replaces it before the call returns.
    pub(crate) fn call<T>(&self, url: &str, payload: &T) -> Result<HttpResponse>
    where
        T: Serialize + ?Sized,
    {
        // Held across the round trip: the server tracks one nonce sequence
        // per account key, so two interleaved signed calls cannot both
        // succeed.
        let mut slot = self.nonce.0.lock();

        let nonce = slot.clone().ok_or_else(|| {
            Error::Configuration(
                "no anti-replay nonce available; fetch the service directory first".to_owned(),
            )
        })?;

        let body = jws::sign_compact(&self.account_key, Some(&nonce), payload)?;

        log::debug!("POST {url}");
        let res = self
            .http
            .post(url, &body, &[("Content-Type", "application/json")])?;

        NonceSlot::observe_locked(&mut slot, &res.headers);

        if res.status >= 400 {
            if let Some(problem) = api::Problem::from_body(&res.body) {
                if problem.is_bad_nonce() {
                    // Not retried here. Callers decide whether a resubmit
                    // with a fresh nonce is appropriate.
                    log::debug!("request rejected for a stale nonce");
                }
            }
        }

        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use base64::prelude::*;
    use serde_json::{json, Value};

    use super::*;
    use crate::test::{response_with_nonce, MockTransport, TEST_KEY_PEM};

    fn transport(mock: Arc<MockTransport>) -> Transport {
        Transport::new(mock, AccountKey::from_pem(TEST_KEY_PEM).unwrap())
    }

    fn header_of(jws: &str) -> Value {
        let header_b64 = jws.split('.').next().unwrap();
        let raw = BASE64_URL_SAFE_NO_PAD.decode(header_b64).unwrap();
        serde_json::from_slice(&raw).unwrap()
    }

    #[test]
    fn test_signed_call_embeds_latest_nonce() {
        let mock = Arc::new(MockTransport::default());
        mock.push(response_with_nonce(200, "N1"));
        mock.push(response_with_nonce(200, "N2"));
        mock.push(response_with_nonce(200, "N3"));

        let transport = transport(Arc::clone(&mock));

        // seed the slot the way a directory fetch does
        transport.get("https://example.test/directory").unwrap();

        transport
            .call("https://example.test/acme/new-reg", &json!({}))
            .unwrap();
        transport
            .call("https://example.test/acme/new-reg", &json!({}))
            .unwrap();

        let calls = mock.calls();
        assert_eq!(header_of(calls[1].body.as_ref().unwrap())["nonce"], "N1");
        assert_eq!(header_of(calls[2].body.as_ref().unwrap())["nonce"], "N2");
    }

    #[test]
    fn test_nonce_kept_when_response_has_none() {
        let mock = Arc::new(MockTransport::default());
        mock.push(response_with_nonce(200, "N1"));
        mock.push(HttpResponse {
            status: 200,
            ..HttpResponse::default()
        });
        mock.push(response_with_nonce(200, "N9"));

        let transport = transport(Arc::clone(&mock));
        transport.get("https://example.test/directory").unwrap();

        transport.call("https://example.test/a", &json!({})).unwrap();
        transport.call("https://example.test/b", &json!({})).unwrap();

        // second signed call reuses N1 since the first response had no nonce
        let calls = mock.calls();
        assert_eq!(header_of(calls[2].body.as_ref().unwrap())["nonce"], "N1");
    }

    #[test]
    fn test_signed_call_without_nonce_is_configuration_error() {
        let mock = Arc::new(MockTransport::default());
        let transport = transport(mock);

        let err = transport
            .call("https://example.test/acme/new-reg", &json!({}))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_poll_get_carries_nonce_header() {
        let mock = Arc::new(MockTransport::default());
        mock.push(response_with_nonce(200, "N1"));
        mock.push(response_with_nonce(200, "N2"));

        let transport = transport(Arc::clone(&mock));
        transport.get("https://example.test/directory").unwrap();
        transport.poll_get("https://example.test/authz/1").unwrap();

        let calls = mock.calls();
        assert_eq!(
            calls[1].headers.get("Nonce").map(String::as_str),
            Some("N1")
        );
    }
}
