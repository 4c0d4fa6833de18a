//! ACME v1 certificate issuance engine.
//!
//! Implements the draft-era protocol dialect still spoken by some private
//! CAs: a `resource`-tagged JSON API, RS256-signed compact JWS requests
//! and combinatorial challenge selection. Domain validation is pluggable
//! through [`challenge::Authenticator`]; an `http-01` web root
//! authenticator is bundled.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use acme::{
//!     api,
//!     challenge::{AuthenticatorRegistry, HttpAuthenticator},
//!     AccountKey, Config, Csr, DirectoryUrl, ReqwestTransport, Session,
//! };
//!
//! fn main() -> acme::Result<()> {
//!     let account_key = AccountKey::generate(2048)?;
//!
//!     let mut authenticators = AuthenticatorRegistry::new();
//!     authenticators.register(
//!         "http-01",
//!         Box::new(HttpAuthenticator::new("/var/www/html")),
//!     );
//!
//!     let config = Config::new(DirectoryUrl::LetsEncryptStaging)
//!         .contact(api::mail_contact("cert-admin@example.com"))
//!         .agreement("https://letsencrypt.org/documents/LE-SA-v1.2-November-15-2017.pdf");
//!
//!     let session = Session::connect(
//!         config,
//!         account_key,
//!         Arc::new(ReqwestTransport::new()?),
//!         authenticators,
//!     )?;
//!
//!     session.register()?;
//!     session.authorize(&api::Identifier::dns("example.com"))?;
//!
//!     let csr = Csr::from_pem(&std::fs::read_to_string("example.com.csr")?)?;
//!     let certificate = session.request_certificate(&csr)?;
//!     std::fs::write("example.com.crt", certificate.to_pem()?)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Domain Ownership
//!
//! Certificates are only issued for identifiers the account has proven
//! control over. The provider offers challenges grouped into
//! combinations; [`Session::authorize`] picks the first combination the
//! registered authenticators can satisfy and completes it.
//!
//! # Use Staging For Development!
//!
//! Public providers rate-limit aggressively. Develop against a staging
//! directory where the limits are relaxed, see
//! [`DirectoryUrl::LetsEncryptStaging`].

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

pub mod api;
pub mod challenge;

mod authz;
mod cert;
mod config;
mod dir;
mod error;
mod http;
mod issue;
mod jws;
mod key;
mod session;
mod trans;

#[cfg(test)]
mod test;

pub use self::{
    cert::{Certificate, Csr},
    config::Config,
    dir::{DirectoryUrl, ServiceDirectory},
    error::{Error, ProtocolError, Result},
    http::{HeaderPairs, Headers, HttpResponse, HttpTransport, ReqwestTransport},
    jws::Jwk,
    key::AccountKey,
    session::{Registration, Session},
};
