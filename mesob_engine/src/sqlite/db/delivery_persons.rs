use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DeliveryPerson, NewDeliveryPerson},
    traits::DeliveryApiError,
};

pub(crate) async fn insert_delivery_person(
    person: NewDeliveryPerson,
    conn: &mut SqliteConnection,
) -> Result<DeliveryPerson, DeliveryApiError> {
    let result: Result<DeliveryPerson, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO delivery_persons (name, email, phone, password_hash, campus)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, campus, created_at;
        "#,
    )
    .bind(&person.name)
    .bind(&person.email)
    .bind(&person.phone)
    .bind(&person.password_hash)
    .bind(person.campus)
    .fetch_one(conn)
    .await;
    match result {
        Ok(person) => Ok(person),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(DeliveryApiError::EmailTaken(person.email))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_delivery_person(
    id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<DeliveryPerson>, sqlx::Error> {
    let person =
        sqlx::query_as("SELECT id, name, email, phone, campus, created_at FROM delivery_persons WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(person)
}

pub async fn fetch_delivery_persons(conn: &mut SqliteConnection) -> Result<Vec<DeliveryPerson>, sqlx::Error> {
    let persons =
        sqlx::query_as("SELECT id, name, email, phone, campus, created_at FROM delivery_persons ORDER BY id")
            .fetch_all(conn)
            .await?;
    Ok(persons)
}

/// Deletes the delivery person. Past deliveries keep their `delivery_person_id` so the record of
/// who delivered what survives.
pub(crate) async fn delete_delivery_person(id: i64, conn: &mut SqliteConnection) -> Result<(), DeliveryApiError> {
    let result = sqlx::query("DELETE FROM delivery_persons WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(DeliveryApiError::PersonNotFound(id));
    }
    debug!("🛵️ Delivery person {id} removed");
    Ok(())
}
