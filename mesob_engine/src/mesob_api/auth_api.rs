//! Unified API for login credential lookups.

use std::fmt::Debug;

use crate::{
    db_types::{Credentials, NewStaff, Role},
    traits::{AuthApiError, AuthManagement},
};

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The stored credentials for this email under this role, or `None`. Callers must not leak
    /// the difference between an unknown email and a bad password to clients.
    pub async fn credentials(&self, role: Role, email: &str) -> Result<Option<Credentials>, AuthApiError> {
        self.db.fetch_credentials(role, email).await
    }

    /// Creates the given admin account if no admin exists yet. Returns true if an account was
    /// created.
    pub async fn ensure_bootstrap_admin(&self, admin: NewStaff) -> Result<bool, AuthApiError> {
        self.db.ensure_bootstrap_admin(admin).await
    }
}
