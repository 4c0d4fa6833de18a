//! Certificate issuance.

use std::{thread, time::Duration};

use crate::{
    api,
    cert::{Certificate, Csr},
    dir,
    error::{Error, ProtocolError, Result},
    session::Session,
};

/// Wait between issuance polls when the provider sends no `Retry-After`.
const DEFAULT_ISSUANCE_WAIT: Duration = Duration::from_secs(1);

impl Session {
    /// Submits a CSR and collects the issued certificate.
    ///
    /// Every identifier named in the CSR must have been authorized on this
    /// session's account beforehand. When the provider answers with a
    /// deferred issuance, the certificate URL is polled until the DER
    /// arrives or the poll budget runs out.
    pub fn request_certificate(&self, csr: &Csr) -> Result<Certificate> {
        let payload = api::NewCertificate::new(csr);

        let url = self.directory().url_for(dir::NEW_CERT)?;
        let res = self.transport().call(url, &payload)?;

        if res.status != 201 {
            return Err(ProtocolError::from_response("certificate request rejected", &res).into());
        }

        let cert_url = res.headers.get("location").ok_or_else(|| {
            ProtocolError::new("certificate response carries no Location header")
        })?;

        // some providers return the DER inline with the 201
        if !res.body.is_empty() {
            log::info!("certificate issued");
            return Ok(Certificate::from_der(res.body.clone()));
        }

        let cert_url = cert_url.to_owned();
        self.wait_certificate(&cert_url)
    }

    /// Polls a certificate URL until the DER arrives.
    fn wait_certificate(&self, url: &str) -> Result<Certificate> {
        let config = self.config();

        for attempt in 1..=config.max_poll_attempts {
            log::debug!("fetch certificate from {url} (attempt {attempt})");
            let res = self.transport().poll_get(url)?;

            match res.status {
                200 => {
                    log::info!("certificate issued");
                    return Ok(Certificate::from_der(res.body));
                }

                // still being signed
                202 => {
                    if attempt < config.max_poll_attempts {
                        let delay = res.headers.retry_after().unwrap_or_else(|| {
                            log::warn!("no Retry-After on deferred issuance, using default");
                            DEFAULT_ISSUANCE_WAIT
                        });
                        thread::sleep(delay);
                    }
                }

                _ => {
                    return Err(
                        ProtocolError::from_response("certificate fetch failed", &res).into(),
                    );
                }
            }
        }

        Err(Error::Timeout {
            attempts: config.max_poll_attempts,
        })
    }
}
