use rsa::{
    pkcs1::DecodeRsaPrivateKey as _,
    pkcs1v15::SigningKey,
    pkcs8::{DecodePrivateKey as _, EncodePrivateKey as _},
    signature::{SignatureEncoding as _, Signer as _},
    traits::PublicKeyParts as _,
    RsaPrivateKey,
};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    error::{Error, Result},
    jws::Jwk,
};

/// RSA account key a session signs its requests with.
///
/// Loaded once and held for the session lifetime. The private key material
/// is owned exclusively here; everything the rest of the engine needs (the
/// public JWK and its thumbprint) is derived at construction and cached.
#[derive(Clone)]
pub struct AccountKey {
    private: RsaPrivateKey,
    signing_key: SigningKey<Sha256>,
    jwk: Jwk,
    thumbprint: String,
}

impl AccountKey {
    /// Generate a fresh RSA account key.
    ///
    /// Providers commonly accept moduli between 2048 and 4096 bits.
    pub fn generate(bits: usize) -> Result<AccountKey> {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(|err| Error::Key(format!("RSA key generation failed: {err}")))?;
        Ok(Self::from_key(private))
    }

    /// Load an account key from PEM, accepting both PKCS#8
    /// (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) encodings.
    pub fn from_pem(pem: &str) -> Result<AccountKey> {
        let private = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|err| Error::Key(format!("failed to read private key PEM: {err}")))?;
        Ok(Self::from_key(private))
    }

    fn from_key(private: RsaPrivateKey) -> AccountKey {
        let public = private.to_public_key();
        let jwk = Jwk::from_rsa(public.e().to_bytes_be(), public.n().to_bytes_be());
        let thumbprint = jwk.thumbprint();

        AccountKey {
            signing_key: SigningKey::new(private.clone()),
            private,
            jwk,
            thumbprint,
        }
    }

    /// The account key as PKCS#8 PEM.
    pub fn to_pem(&self) -> Result<Zeroizing<String>> {
        self.private
            .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
            .map_err(|err| Error::Key(format!("private key to PEM failed: {err}")))
    }

    /// Public key as the JWK embedded in every signed request header.
    pub fn jwk(&self) -> &Jwk {
        &self.jwk
    }

    /// SHA-256 thumbprint of the JWK, unpadded base64url.
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    /// Key authorization string for a challenge token:
    /// `token + "." + thumbprint`.
    pub fn key_authorization(&self, token: &str) -> String {
        format!("{token}.{}", self.thumbprint)
    }

    /// RS256 (PKCS#1 v1.5 over SHA-256) signature of `data`.
    pub(crate) fn sign(&self, data: &[u8]) -> Vec<u8> {
        self.signing_key.sign(data).to_vec()
    }

    #[cfg(test)]
    pub(crate) fn verifying_key(&self) -> rsa::pkcs1v15::VerifyingKey<Sha256> {
        use rsa::signature::Keypair as _;

        self.signing_key.verifying_key()
    }
}

impl std::fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKey")
            .field("thumbprint", &self.thumbprint)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test;

    #[test]
    fn test_thumbprint_matches_known_vector() {
        let key = AccountKey::from_pem(test::TEST_KEY_PEM).unwrap();
        assert_eq!(key.thumbprint(), test::TEST_KEY_THUMBPRINT);
    }

    #[test]
    fn test_key_authorization_format() {
        let key = AccountKey::from_pem(test::TEST_KEY_PEM).unwrap();
        let expected = format!("tok-123.{}", test::TEST_KEY_THUMBPRINT);
        assert_eq!(key.key_authorization("tok-123"), expected);
    }

    #[test]
    fn test_pem_round_trip_preserves_thumbprint() {
        let key = AccountKey::from_pem(test::TEST_KEY_PEM).unwrap();
        let pem = key.to_pem().unwrap();
        let reloaded = AccountKey::from_pem(&pem).unwrap();
        assert_eq!(reloaded.thumbprint(), key.thumbprint());
    }
}
