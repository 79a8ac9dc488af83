use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewStaff, Role, Staff},
    traits::StaffApiError,
};

pub(crate) async fn insert_staff(staff: NewStaff, conn: &mut SqliteConnection) -> Result<Staff, StaffApiError> {
    let result: Result<Staff, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO staff (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, created_at;
        "#,
    )
    .bind(&staff.name)
    .bind(&staff.email)
    .bind(&staff.password_hash)
    .bind(staff.role)
    .fetch_one(conn)
    .await;
    match result {
        Ok(staff) => {
            debug!("🗝️ Staff member added with {} role", staff.role);
            Ok(staff)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => Err(StaffApiError::EmailTaken(staff.email)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_staff(conn: &mut SqliteConnection) -> Result<Vec<Staff>, sqlx::Error> {
    let staff =
        sqlx::query_as("SELECT id, name, email, role, created_at FROM staff ORDER BY id").fetch_all(conn).await?;
    Ok(staff)
}

pub async fn count_staff_with_role(role: crate::db_types::Role, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM staff WHERE role = $1").bind(role).fetch_one(conn).await?;
    Ok(count)
}
