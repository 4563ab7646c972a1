//! Repository credentials resolved for a single composition pass.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// A username/password pair for the artifact and image repositories.
///
/// The password is held as a [`SecretString`]; `Debug` never prints it.
pub struct CredentialMaterial {
    username: String,
    password: SecretString,
}

impl CredentialMaterial {
    pub fn new(username: &str, password: SecretString) -> Self {
        Self {
            username: username.to_owned(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Expose the password to an external tool's configuration surface.
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Clone for CredentialMaterial {
    fn clone(&self) -> Self {
        Self {
            username: self.username.clone(),
            password: SecretString::from(self.password.expose_secret().to_owned()),
        }
    }
}

impl fmt::Debug for CredentialMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialMaterial")
            .field("username", &"[REDACTED]")
            .field("password", &"[REDACTED]")
            .finish()
    }
}
