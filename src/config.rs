use std::time::Duration;

use crate::dir::DirectoryUrl;

/// Engine configuration for one session.
///
/// Per-authenticator configuration (like the http-01 web root) is given to
/// the authenticator at construction instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL serving the service directory.
    pub directory_url: String,

    /// Contact identifiers for registration, e.g. `mailto:` entries built
    /// with [`mail_contact`](crate::api::mail_contact).
    pub contacts: Vec<String>,

    /// Terms-of-service URL agreed to during registration.
    pub agreement: String,

    /// Upper bound on poll attempts for authorization and issuance
    /// polling. Guarantees termination; unbounded polling is not
    /// available.
    pub max_poll_attempts: usize,

    /// Poll interval used when the provider sends no `Retry-After`.
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(url: DirectoryUrl<'_>) -> Config {
        Config {
            directory_url: url.to_url().to_owned(),
            ..Config::default()
        }
    }

    pub fn contact(mut self, contact: impl Into<String>) -> Config {
        self.contacts.push(contact.into());
        self
    }

    pub fn agreement(mut self, url: impl Into<String>) -> Config {
        self.agreement = url.into();
        self
    }

    pub fn max_poll_attempts(mut self, attempts: usize) -> Config {
        self.max_poll_attempts = attempts;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Config {
        self.poll_interval = interval;
        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            directory_url: DirectoryUrl::LetsEncryptStaging.to_url().to_owned(),
            contacts: Vec::new(),
            agreement: String::new(),
            max_poll_attempts: 20,
            poll_interval: Duration::from_secs(1),
        }
    }
}
