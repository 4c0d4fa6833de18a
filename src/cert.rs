//! Certificate and CSR entities.
//!
//! Both are opaque DER to the engine; on the wire they travel as unpadded
//! base64url of the raw bytes, and at rest they armor as PEM. The PEM
//! codec is shared, parametrized by the type label.

use base64::prelude::*;

use crate::error::{Error, Result};

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const CSR_LABEL: &str = "CERTIFICATE REQUEST";

/// Decodes a PEM document with the expected type label into its DER bytes.
fn pem_decode(label: &str, pem: &str) -> Result<Vec<u8>> {
    let (found, der) = pem::decode_vec(pem.as_bytes())?;

    if found != label {
        return Err(Error::Key(format!("expected {label} PEM, found {found}")));
    }

    Ok(der)
}

/// Armors DER bytes as PEM with the given type label, base64 body wrapped
/// at 64 characters.
fn pem_encode(label: &str, der: &[u8]) -> Result<String> {
    Ok(pem::encode_string(label, pem::LineEnding::LF, der)?)
}

/// An issued X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Wraps raw DER bytes, e.g. an issuance response body.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Certificate {
        Certificate { der: der.into() }
    }

    pub fn from_pem(pem: &str) -> Result<Certificate> {
        Ok(Certificate {
            der: pem_decode(CERTIFICATE_LABEL, pem)?,
        })
    }

    /// The raw DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> Result<String> {
        pem_encode(CERTIFICATE_LABEL, &self.der)
    }

    /// Unpadded base64url of the DER, the form signed requests carry.
    pub(crate) fn to_wire_base64(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(&self.der)
    }
}

/// A certificate signing request produced outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Csr {
    der: Vec<u8>,
}

impl Csr {
    /// Wraps raw DER bytes.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Csr {
        Csr { der: der.into() }
    }

    pub fn from_pem(pem: &str) -> Result<Csr> {
        Ok(Csr {
            der: pem_decode(CSR_LABEL, pem)?,
        })
    }

    /// The raw DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn to_pem(&self) -> Result<String> {
        pem_encode(CSR_LABEL, &self.der)
    }

    /// Unpadded base64url of the DER, the form signed requests carry.
    pub(crate) fn to_wire_base64(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(&self.der)
    }
}
