use thiserror::Error;

use crate::{
    db_types::{Credentials, NewStaff, Role},
    traits::StaffApiError,
};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

impl From<StaffApiError> for AuthApiError {
    fn from(e: StaffApiError) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Login support. Each role reads from its own table (staff, delivery persons or customers),
/// which is why lookups are keyed on role as well as email. Password verification happens in the
/// server; the backend only hands over the stored hash.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Fetches the stored credentials for the account with this email under this role, or `None`
    /// if no such account exists.
    async fn fetch_credentials(&self, role: Role, email: &str) -> Result<Option<Credentials>, AuthApiError>;

    /// Creates the given admin account if no admin exists yet. Returns true if an account was
    /// created. Called once at server startup so a fresh database is never locked out.
    async fn ensure_bootstrap_admin(&self, admin: NewStaff) -> Result<bool, AuthApiError>;
}
