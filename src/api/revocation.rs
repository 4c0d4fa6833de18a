use serde::Serialize;

use crate::cert::Certificate;

/// Signed body posted to the `revoke-cert` resource.
#[derive(Debug, Clone, Serialize)]
pub struct Revocation {
    pub resource: &'static str,

    /// The certificate to be revoked, in the base64url-encoded version of
    /// the DER format.
    ///
    /// Note: not PEM, since headers are omitted.
    pub certificate: String,
}

impl Revocation {
    pub(crate) fn new(cert: &Certificate) -> Self {
        Self {
            resource: "revoke-cert",
            certificate: cert.to_wire_base64(),
        }
    }
}
