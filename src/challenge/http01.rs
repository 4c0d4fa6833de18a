use std::{fs, path::PathBuf};

use crate::{
    api,
    challenge::{Authenticator, ProofHandle},
    error::Result,
    key::AccountKey,
};

/// Path under the web root the remote validator fetches challenges from.
pub const CHALLENGE_PREFIX: &str = ".well-known/acme-challenge";

/// Filesystem-based `http-01` authenticator.
///
/// Writes the key authorization verbatim into a file named after the
/// challenge token under the configured web root's well-known challenge
/// path, so it is served at:
///
/// ```text
/// http://<domain-to-be-proven>/.well-known/acme-challenge/<token>
/// ```
///
/// The web server itself must already serve the web root; this only
/// places and removes the file.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    webroot: PathBuf,
}

impl HttpAuthenticator {
    pub fn new(webroot: impl Into<PathBuf>) -> HttpAuthenticator {
        HttpAuthenticator {
            webroot: webroot.into(),
        }
    }
}

impl Authenticator for HttpAuthenticator {
    fn prepare(
        &self,
        _account_key: &AccountKey,
        challenge: &api::Challenge,
        key_authorization: &str,
    ) -> Result<Box<dyn ProofHandle>> {
        // the token names the file; only the validated charset may pass
        let token = challenge.validate_token()?;

        let challenge_dir = self.webroot.join(CHALLENGE_PREFIX);
        fs::create_dir_all(&challenge_dir)?;

        let path = challenge_dir.join(token);
        log::info!("create authorization file {}", path.display());
        fs::write(&path, key_authorization)?;

        Ok(Box::new(ChallengeFile { path: Some(path) }))
    }
}

/// Handle for one published challenge file.
struct ChallengeFile {
    path: Option<PathBuf>,
}

impl ProofHandle for ChallengeFile {
    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };

        log::info!("remove authorization file {}", path.display());
        if let Err(err) = fs::remove_file(&path) {
            log::warn!("failed to remove {}: {err}", path.display());
        }
    }
}

impl Drop for ChallengeFile {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::test;

    fn challenge_path(webroot: &Path, token: &str) -> PathBuf {
        webroot.join(CHALLENGE_PREFIX).join(token)
    }

    fn pending_challenge(token: &str) -> api::Challenge {
        api::Challenge {
            _type: "http-01".to_owned(),
            token: token.to_owned(),
            ..api::Challenge::default()
        }
    }

    #[test]
    fn test_prepare_writes_key_authorization() {
        let webroot = tempfile::tempdir().unwrap();
        let authenticator = HttpAuthenticator::new(webroot.path());

        let mut handle = authenticator
            .prepare(
                &test::test_account_key(),
                &pending_challenge("tok-abc"),
                "tok-abc.thumbprint",
            )
            .unwrap();

        let path = challenge_path(webroot.path(), "tok-abc");
        assert_eq!(fs::read_to_string(&path).unwrap(), "tok-abc.thumbprint");

        handle.cleanup();
        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let webroot = tempfile::tempdir().unwrap();
        let authenticator = HttpAuthenticator::new(webroot.path());

        let mut handle = authenticator
            .prepare(
                &test::test_account_key(),
                &pending_challenge("tok"),
                "tok.thumbprint",
            )
            .unwrap();

        handle.cleanup();
        // second cleanup must be a no-op, not an error
        handle.cleanup();
    }

    #[test]
    fn test_traversal_token_never_reaches_filesystem() {
        let webroot = tempfile::tempdir().unwrap();
        let authenticator = HttpAuthenticator::new(webroot.path());

        let result = authenticator.prepare(
            &test::test_account_key(),
            &pending_challenge("../../etc/evil"),
            "irrelevant",
        );

        assert!(result.is_err());
        assert!(!webroot.path().join(CHALLENGE_PREFIX).exists());
    }

    #[test]
    fn test_dropping_handle_removes_file() {
        let webroot = tempfile::tempdir().unwrap();
        let authenticator = HttpAuthenticator::new(webroot.path());

        let path = challenge_path(webroot.path(), "tok-drop");
        {
            let _handle = authenticator
                .prepare(
                    &test::test_account_key(),
                    &pending_challenge("tok-drop"),
                    "tok-drop.thumbprint",
                )
                .unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }
}
