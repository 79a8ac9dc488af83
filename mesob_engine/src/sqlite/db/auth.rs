use log::info;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Credentials, NewStaff, Role},
    sqlite::db::staff,
    traits::AuthApiError,
};

/// Looks up the stored credentials for `email` under `role`. Each role reads from its own table.
pub async fn fetch_credentials(
    role: Role,
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Credentials>, sqlx::Error> {
    let creds = match role {
        Role::Admin | Role::RestaurantOwner => {
            sqlx::query_as("SELECT id, name, password_hash FROM staff WHERE email = $1 AND role = $2")
                .bind(email)
                .bind(role)
                .fetch_optional(conn)
                .await?
        },
        Role::DeliveryPerson => {
            sqlx::query_as("SELECT id, name, password_hash FROM delivery_persons WHERE email = $1")
                .bind(email)
                .fetch_optional(conn)
                .await?
        },
        Role::Customer => {
            sqlx::query_as("SELECT id, name, password_hash FROM customers WHERE email = $1")
                .bind(email)
                .fetch_optional(conn)
                .await?
        },
    };
    Ok(creds)
}

/// Creates the given admin account if the staff table holds no admin yet. Returns true if the
/// account was created.
pub(crate) async fn ensure_bootstrap_admin(admin: NewStaff, conn: &mut SqliteConnection) -> Result<bool, AuthApiError> {
    let admins = staff::count_staff_with_role(Role::Admin, conn).await?;
    if admins > 0 {
        return Ok(false);
    }
    let staff = staff::insert_staff(admin, conn).await?;
    info!("🗝️ Bootstrap admin account created for {}", staff.email);
    Ok(true)
}
