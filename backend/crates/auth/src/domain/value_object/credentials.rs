//! Plaintext Credentials
//!
//! Output of the credential decoder. The password buffer is wiped on drop
//! and never printed.

use std::fmt;
use zeroize::Zeroizing;

pub struct PlainCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl PlainCredentials {
    pub fn new(username: String, password: Zeroizing<String>) -> Self {
        Self { username, password }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for PlainCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
