use serde::Serialize;

use crate::cert::Csr;

/// Signed body posted to the `new-cert` resource.
#[derive(Debug, Clone, Serialize)]
pub struct NewCertificate {
    pub resource: &'static str,

    /// The CSR in the base64url-encoded version of the DER format.
    ///
    /// Note: not PEM, since headers are omitted.
    pub csr: String,
}

impl NewCertificate {
    pub(crate) fn new(csr: &Csr) -> Self {
        Self {
            resource: "new-cert",
            csr: csr.to_wire_base64(),
        }
    }
}
