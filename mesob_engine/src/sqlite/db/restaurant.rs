use log::debug;
use sqlx::{types::Json, SqliteConnection};

use crate::{
    db_types::{NewRestaurant, Restaurant},
    traits::RestaurantApiError,
};

/// Creates the restaurant profile. The table pins the row id to 1, so a second insert trips the
/// primary key and comes back as [`RestaurantApiError::ProfileAlreadyExists`].
pub(crate) async fn insert_restaurant(
    profile: NewRestaurant,
    conn: &mut SqliteConnection,
) -> Result<Restaurant, RestaurantApiError> {
    let result: Result<Restaurant, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO restaurant (id, name, description, opening_hours, phone, email, social_links)
            VALUES (1, $1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(&profile.name)
    .bind(&profile.description)
    .bind(&profile.opening_hours)
    .bind(&profile.phone)
    .bind(&profile.email)
    .bind(Json(&profile.social_links))
    .fetch_one(conn)
    .await;
    match result {
        Ok(profile) => {
            debug!("🏪️ Restaurant profile created");
            Ok(profile)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => Err(RestaurantApiError::ProfileAlreadyExists),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_restaurant(conn: &mut SqliteConnection) -> Result<Option<Restaurant>, sqlx::Error> {
    let profile = sqlx::query_as("SELECT * FROM restaurant WHERE id = 1").fetch_optional(conn).await?;
    Ok(profile)
}

pub(crate) async fn upsert_restaurant(
    profile: NewRestaurant,
    conn: &mut SqliteConnection,
) -> Result<Restaurant, RestaurantApiError> {
    let profile = sqlx::query_as(
        r#"
            INSERT INTO restaurant (id, name, description, opening_hours, phone, email, social_links)
            VALUES (1, $1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET name = excluded.name,
                description = excluded.description,
                opening_hours = excluded.opening_hours,
                phone = excluded.phone,
                email = excluded.email,
                social_links = excluded.social_links,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(&profile.name)
    .bind(&profile.description)
    .bind(&profile.opening_hours)
    .bind(&profile.phone)
    .bind(&profile.email)
    .bind(Json(&profile.social_links))
    .fetch_one(conn)
    .await?;
    debug!("🏪️ Restaurant profile updated");
    Ok(profile)
}
