//! crates/brigo_client/src/session.rs
//!
//! The signed-in user on this device. `Session` is the app's identity provider.

use brigo_core::domain::AuthUser;
use brigo_core::ports::IdentityProvider;
use std::sync::{PoisonError, RwLock};

#[derive(Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub user: AuthUser,
    /// Auth session id issued by the backend.
    pub token: String,
}

impl std::fmt::Debug for SignedIn {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SignedIn")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<SignedIn>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, signed_in: SignedIn) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(signed_in);
    }

    /// Forgets the signed-in user, returning who it was.
    pub fn sign_out(&self) -> Option<SignedIn> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn current(&self) -> Option<SignedIn> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }
}

impl IdentityProvider for Session {
    fn current_user(&self) -> Option<AuthUser> {
        self.current().map(|signed_in| signed_in.user)
    }
}
