//! Compact JWS request signing.
//!
//! Every mutating call carries a three-segment signature string
//! `header.payload.signature`; each segment is unpadded base64url. The
//! header embeds the account's public JWK and the current anti-replay
//! nonce.

use base64::prelude::*;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::{error::Result, key::AccountKey};

/// RSA public key in JWK form.
///
/// Field order is lexical (`e`, `kty`, `n`) and serialization is compact,
/// so serializing this struct directly yields the canonical JSON the
/// thumbprint is defined over.
// LEXICAL ORDER OF FIELDS MATTER!
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jwk {
    e: String,
    kty: String,
    n: String,
}

impl Jwk {
    /// Builds the JWK from big-endian public exponent and modulus bytes.
    pub(crate) fn from_rsa(e: Vec<u8>, n: Vec<u8>) -> Jwk {
        Jwk {
            e: BASE64_URL_SAFE_NO_PAD.encode(e),
            kty: "RSA".to_owned(),
            n: BASE64_URL_SAFE_NO_PAD.encode(n),
        }
    }

    /// SHA-256 over the canonical JWK JSON, unpadded base64url.
    pub(crate) fn thumbprint(&self) -> String {
        // cannot fail: the struct is three plain strings
        let canonical = serde_json::to_string(self).expect("JWK serialization");
        BASE64_URL_SAFE_NO_PAD.encode(Sha256::digest(canonical))
    }
}

/// Protected header of a signed request.
#[derive(Debug, Serialize)]
struct ProtectedHeader<'a> {
    typ: &'static str,
    alg: &'static str,
    jwk: &'a Jwk,
    #[serde(skip_serializing_if = "Option::is_none")]
    nonce: Option<&'a str>,
}

/// Signs `payload` into the compact `header.payload.signature` form.
///
/// The header and payload encodings are deterministic for a given key,
/// nonce and payload; only the signature segment depends on the private
/// key material.
pub(crate) fn sign_compact<T>(key: &AccountKey, nonce: Option<&str>, payload: &T) -> Result<String>
where
    T: Serialize + ?Sized,
{
    let header = ProtectedHeader {
        typ: "JWT",
        alg: "RS256",
        jwk: key.jwk(),
        nonce,
    };

    let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
    let payload_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(payload)?);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature_b64 = BASE64_URL_SAFE_NO_PAD.encode(key.sign(signing_input.as_bytes()));

    Ok(format!("{signing_input}.{signature_b64}"))
}

#[cfg(test)]
mod tests {
    use rsa::{pkcs1v15::Signature, signature::Verifier as _};
    use serde_json::{json, Value};

    use super::*;
    use crate::test;

    fn test_key() -> AccountKey {
        AccountKey::from_pem(test::TEST_KEY_PEM).unwrap()
    }

    fn decode_segment(segment: &str) -> Vec<u8> {
        BASE64_URL_SAFE_NO_PAD.decode(segment).unwrap()
    }

    #[test]
    fn test_compact_form_has_three_segments() {
        let jws = sign_compact(&test_key(), Some("nonce-1"), &json!({"resource": "new-reg"}))
            .unwrap();
        assert_eq!(jws.split('.').count(), 3);
    }

    #[test]
    fn test_header_embeds_nonce_and_jwk() {
        let key = test_key();
        let jws = sign_compact(&key, Some("N2"), &json!({"resource": "new-reg"})).unwrap();

        let header_b64 = jws.split('.').next().unwrap();
        let header = serde_json::from_slice::<Value>(&decode_segment(header_b64)).unwrap();

        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["nonce"], "N2");
        assert_eq!(header["jwk"]["kty"], "RSA");
        assert_eq!(header["jwk"]["e"], "AQAB");
    }

    #[test]
    fn test_nonce_omitted_when_absent() {
        let jws = sign_compact(&test_key(), None, &json!({})).unwrap();
        let header_b64 = jws.split('.').next().unwrap();
        let header = serde_json::from_slice::<Value>(&decode_segment(header_b64)).unwrap();
        assert!(header.get("nonce").is_none());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let key = test_key();
        let payload = json!({"resource": "new-authz", "identifier": {"type": "dns"}});

        let a = sign_compact(&key, Some("same"), &payload).unwrap();
        let b = sign_compact(&key, Some("same"), &payload).unwrap();

        let a_parts = a.split('.').collect::<Vec<_>>();
        let b_parts = b.split('.').collect::<Vec<_>>();
        assert_eq!(a_parts[0], b_parts[0]);
        assert_eq!(a_parts[1], b_parts[1]);
    }

    #[test]
    fn test_signature_verifies_under_account_key() {
        let key = test_key();
        let jws = sign_compact(&key, Some("n"), &json!({"resource": "new-cert"})).unwrap();

        let parts = jws.split('.').collect::<Vec<_>>();
        let signing_input = format!("{}.{}", parts[0], parts[1]);
        let signature = Signature::try_from(decode_segment(parts[2]).as_slice()).unwrap();

        key.verifying_key()
            .verify(signing_input.as_bytes(), &signature)
            .unwrap();
    }

    #[test]
    fn test_thumbprint_matches_known_vector() {
        assert_eq!(test_key().jwk().thumbprint(), test::TEST_KEY_THUMBPRINT);
    }
}
