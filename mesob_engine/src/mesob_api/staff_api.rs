//! Unified API for staff account management.

use std::fmt::Debug;

use crate::{
    db_types::{NewStaff, Staff},
    traits::{StaffApiError, StaffManagement},
};

pub struct StaffApi<B> {
    db: B,
}

impl<B: Debug> Debug for StaffApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StaffApi ({:?})", self.db)
    }
}

impl<B> StaffApi<B>
where B: StaffManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn add_staff(&self, staff: NewStaff) -> Result<Staff, StaffApiError> {
        self.db.insert_staff(staff).await
    }

    pub async fn staff_members(&self) -> Result<Vec<Staff>, StaffApiError> {
        self.db.fetch_staff().await
    }
}
