//! Session lifecycle: connect, register, revoke.

use std::sync::Arc;

use crate::{
    api,
    cert::Certificate,
    challenge::AuthenticatorRegistry,
    config::Config,
    dir::{self, ServiceDirectory},
    error::{ProtocolError, Result},
    http::HttpTransport,
    key::AccountKey,
    trans::Transport,
};

/// Outcome of a registration request.
///
/// Re-registering an existing account key is reported, not failed; the
/// account is usable either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Whether this request created the account, as opposed to finding an
    /// existing one for the same key.
    pub created: bool,

    /// Account URL from the `Location` header, when the provider sent one.
    pub location: Option<String>,

    /// Raw HTTP status of the response.
    pub status: u16,
}

/// One account's connection to one provider.
///
/// Holds the signed-request transport, the fetched endpoint map and the
/// registered authenticators. All operations borrow the session; nothing
/// is shared between sessions.
pub struct Session {
    transport: Transport,
    directory: ServiceDirectory,
    config: Config,
    authenticators: AuthenticatorRegistry,
}

impl Session {
    /// Connects to a provider by fetching and validating its directory.
    ///
    /// The directory response also seeds the anti-replay nonce, so a
    /// freshly connected session can immediately make signed calls.
    pub fn connect(
        config: Config,
        account_key: AccountKey,
        http: Arc<dyn HttpTransport>,
        authenticators: AuthenticatorRegistry,
    ) -> Result<Session> {
        let transport = Transport::new(http, account_key);
        let directory = ServiceDirectory::fetch(&transport, &config.directory_url)?;

        Ok(Session {
            transport,
            directory,
            config,
            authenticators,
        })
    }

    /// Re-fetches the endpoint map, replacing it wholesale.
    pub fn refresh_directory(&mut self) -> Result<()> {
        self.directory = ServiceDirectory::fetch(&self.transport, &self.config.directory_url)?;
        Ok(())
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The endpoint map fetched at connect time.
    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn authenticators(&self) -> &AuthenticatorRegistry {
        &self.authenticators
    }

    /// Registers the account key with the provider.
    ///
    /// HTTP 201 means the account was created; 409 means the key is
    /// already registered, which leaves the account just as usable and is
    /// therefore a success.
    pub fn register(&self) -> Result<Registration> {
        let payload = api::NewRegistration::new(&self.config.contacts, &self.config.agreement);

        let url = self.directory.url_for(dir::NEW_REG)?;
        let res = self.transport.call(url, &payload)?;

        match res.status {
            201 => {
                log::info!("account registered");
                Ok(Registration {
                    created: true,
                    location: res.headers.get("location").map(str::to_owned),
                    status: res.status,
                })
            }
            409 => {
                log::info!("account key already registered");
                Ok(Registration {
                    created: false,
                    location: res.headers.get("location").map(str::to_owned),
                    status: res.status,
                })
            }
            _ => Err(ProtocolError::from_response("registration rejected", &res).into()),
        }
    }

    /// Asks the provider to revoke an issued certificate.
    pub fn revoke_certificate(&self, certificate: &Certificate) -> Result<()> {
        let payload = api::Revocation::new(certificate);

        let url = self.directory.url_for(dir::REVOKE_CERT)?;
        let res = self.transport.call(url, &payload)?;

        if res.status != 200 {
            return Err(ProtocolError::from_response("revocation rejected", &res).into());
        }

        log::info!("certificate revoked");
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("directory_url", &self.config.directory_url)
            .field("authenticators", &self.authenticators)
            .finish()
    }
}
