//! Shared-secret access for administrative actions

use std::fmt;

use subtle::ConstantTimeEq;

/// Checks tokens presented by callers against the configured admin secret.
///
/// With no secret configured every token is rejected.
#[derive(Clone, Default)]
pub struct AdminGuard {
    token: Option<String>,
}

impl AdminGuard {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    /// Whether `presented` matches the admin secret, compared in constant time
    pub fn verify_admin_token(&self, presented: &str) -> bool {
        match &self.token {
            Some(expected) => expected.as_bytes().ct_eq(presented.as_bytes()).into(),
            None => false,
        }
    }
}

impl fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGuard")
            .field("configured", &self.is_configured())
            .finish()
    }
}
