use thiserror::Error;

use crate::db_types::{NewStaff, Staff};

#[derive(Debug, Clone, Error)]
pub enum StaffApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A staff member with email {0} already exists")]
    EmailTaken(String),
}

impl From<sqlx::Error> for StaffApiError {
    fn from(e: sqlx::Error) -> Self {
        StaffApiError::DatabaseError(e.to_string())
    }
}

/// Management of staff accounts (admins and restaurant owners). Customers and delivery persons
/// live in their own tables and are managed through their own traits.
#[allow(async_fn_in_trait)]
pub trait StaffManagement {
    async fn insert_staff(&self, staff: NewStaff) -> Result<Staff, StaffApiError>;

    async fn fetch_staff(&self) -> Result<Vec<Staff>, StaffApiError>;
}
