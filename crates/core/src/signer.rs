//! Signing identities passed through to the external toolchain.

use std::path::PathBuf;

/// Supplies the public key used in argument substitution and the credential
/// flags appended to every deploy/send invocation.
pub trait Signer: Send + Sync {
    /// Public address of the signing account.
    fn public_key(&self) -> &str;

    /// Command-line flags that let the external tool sign.
    fn credential_args(&self) -> Vec<String>;
}

impl<S: Signer + ?Sized> Signer for Box<S> {
    fn public_key(&self) -> &str {
        (**self).public_key()
    }

    fn credential_args(&self) -> Vec<String> {
        (**self).credential_args()
    }
}

/// Signs with a raw private key.
#[derive(Clone)]
pub struct PrivateKeySigner {
    public_key: String,
    private_key: String,
}

impl PrivateKeySigner {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }
}

impl std::fmt::Debug for PrivateKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeySigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl Signer for PrivateKeySigner {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn credential_args(&self) -> Vec<String> {
        vec!["--private-key".to_string(), self.private_key.clone()]
    }
}

/// Signs with an encrypted keystore file.
#[derive(Clone)]
pub struct KeystoreSigner {
    public_key: String,
    keystore: PathBuf,
    password: Option<String>,
}

impl KeystoreSigner {
    pub fn new(
        public_key: impl Into<String>,
        keystore: impl Into<PathBuf>,
        password: Option<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            keystore: keystore.into(),
            password,
        }
    }
}

impl std::fmt::Debug for KeystoreSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreSigner")
            .field("public_key", &self.public_key)
            .field("keystore", &self.keystore)
            .finish_non_exhaustive()
    }
}

impl Signer for KeystoreSigner {
    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn credential_args(&self) -> Vec<String> {
        let mut args = vec![
            "--keystore".to_string(),
            self.keystore.to_string_lossy().into_owned(),
        ];
        if let Some(password) = &self.password {
            args.push("--password".to_string());
            args.push(password.clone());
        }
        args
    }
}
