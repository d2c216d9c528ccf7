//! Login endpoint

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub domain_name: String,
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        domain_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.domain_name.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("domain_name", &self.domain_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response from POST /login
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: String,
}
