use std::collections::HashMap;

use crate::{
    error::{Error, ProtocolError, Result},
    trans::Transport,
};

const LETSENCRYPT_URL: &str = "https://acme-v01.api.letsencrypt.org/directory";
const LETSENCRYPT_STAGING_URL: &str = "https://acme-staging.api.letsencrypt.org/directory";

/// Resource names the engine requires a directory to map.
pub const NEW_AUTHZ: &str = "new-authz";
pub const NEW_REG: &str = "new-reg";
pub const NEW_CERT: &str = "new-cert";
pub const REVOKE_CERT: &str = "revoke-cert";

const REQUIRED_RESOURCES: &[&str] = &[NEW_AUTHZ, NEW_REG, NEW_CERT, REVOKE_CERT];

/// Enumeration of known ACME API directories.
#[derive(Debug, Clone)]
pub enum DirectoryUrl<'a> {
    /// The main Let's Encrypt directory.
    ///
    /// Not appropriate for testing / development.
    LetsEncrypt,

    /// The staging Let's Encrypt directory.
    ///
    /// Use for testing and development. Doesn't issue "valid" certificates.
    LetsEncryptStaging,

    /// Provide an arbitrary directory URL to connect to.
    Other(&'a str),
}

impl DirectoryUrl<'_> {
    pub fn to_url(&self) -> &str {
        match self {
            DirectoryUrl::LetsEncrypt => LETSENCRYPT_URL,
            DirectoryUrl::LetsEncryptStaging => LETSENCRYPT_STAGING_URL,
            DirectoryUrl::Other(url) => url,
        }
    }
}

/// The provider's endpoint map, fetched from the base URL.
///
/// Replaced wholesale on refresh and immutable in between.
#[derive(Debug, Clone)]
pub struct ServiceDirectory {
    resources: HashMap<String, String>,
}

impl ServiceDirectory {
    /// Fetches and validates the endpoint map.
    ///
    /// Requires HTTP 200 and entries for `new-authz`, `new-reg`, `new-cert`
    /// and `revoke-cert`; a directory missing any of them fails with a
    /// configuration error before any mutating call can happen. The
    /// response nonce seeds the transport's slot as a side effect of the
    /// fetch.
    pub(crate) fn fetch(transport: &Transport, url: &str) -> Result<ServiceDirectory> {
        log::debug!("request directory from {url}");
        let res = transport.get(url)?;

        if res.status != 200 {
            return Err(ProtocolError::from_response("directory fetch failed", &res).into());
        }

        let raw: HashMap<String, serde_json::Value> = serde_json::from_slice(&res.body)?;

        // non-string values ("meta" and friends) are not resources
        let resources: HashMap<String, String> = raw
            .into_iter()
            .filter_map(|(name, value)| Some((name, value.as_str()?.to_owned())))
            .collect();

        for required in REQUIRED_RESOURCES {
            if !resources.contains_key(*required) {
                return Err(Error::Configuration(format!(
                    "{required} not found in directory"
                )));
            }
        }

        Ok(ServiceDirectory { resources })
    }

    /// URL of a directory resource.
    pub fn url_for(&self, resource: &str) -> Result<&str> {
        self.resources
            .get(resource)
            .map(String::as_str)
            .ok_or_else(|| Error::Configuration(format!("{resource} not found in directory")))
    }
}
