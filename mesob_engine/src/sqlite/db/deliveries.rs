use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Delivery, DeliveryStatusType, NewDelivery},
    delivery_objects::DeliveryQueryFilter,
    traits::DeliveryApiError,
};

/// Inserts the delivery row. The unique index on `order_id` makes this the final arbiter in an
/// assignment race: the second writer gets [`DeliveryApiError::AlreadyAssigned`].
pub(crate) async fn insert_delivery(
    delivery: NewDelivery,
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Delivery, DeliveryApiError> {
    let result: Result<Delivery, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO deliveries (order_id, delivery_person_id, customer_id)
            VALUES ($1, $2, $3)
            RETURNING *;
        "#,
    )
    .bind(delivery.order_id)
    .bind(delivery.delivery_person_id)
    .bind(customer_id)
    .fetch_one(conn)
    .await;
    match result {
        Ok(delivery) => {
            debug!("🛵️ Delivery {} created for order {}", delivery.id, delivery.order_id);
            Ok(delivery)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(DeliveryApiError::AlreadyAssigned(delivery.order_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_delivery(id: i64, conn: &mut SqliteConnection) -> Result<Option<Delivery>, sqlx::Error> {
    let delivery = sqlx::query_as("SELECT * FROM deliveries WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(delivery)
}

pub async fn fetch_delivery_for_order(
    order_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Delivery>, sqlx::Error> {
    let delivery =
        sqlx::query_as("SELECT * FROM deliveries WHERE order_id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(delivery)
}

/// Fetches deliveries according to the criteria specified in the `DeliveryQueryFilter`.
///
/// Resulting deliveries are sorted by `created_at`, newest first.
pub async fn search_deliveries(
    query: DeliveryQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Delivery>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM deliveries
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(person) = query.delivery_person_id {
        where_clause.push("delivery_person_id = ");
        where_clause.push_bind_unseparated(person);
    }
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(order_id) = query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id);
    }
    if let Some(campus) = query.campus {
        where_clause.push("delivery_person_id IN (SELECT id FROM delivery_persons WHERE campus = ");
        where_clause.push_bind_unseparated(campus);
        where_clause.push_unseparated(")");
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(verified) = query.verified {
        where_clause.push("customer_verified = ");
        where_clause.push_bind_unseparated(verified);
    }
    // Stored timestamps come from CURRENT_TIMESTAMP, so bounds are compared in the same format.
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Some(until) = query.until {
        where_clause.push("created_at < ");
        where_clause.push_bind_unseparated(until.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    trace!("🛵️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Delivery>();
    let deliveries = query.fetch_all(conn).await?;
    trace!("🛵️ Result of search_deliveries: {:?}", deliveries.len());
    Ok(deliveries)
}

/// Sets the delivery status. `delivered_at` is stamped exactly once, on the first transition to
/// `delivered`. Moving the status away again does not clear it.
pub(crate) async fn update_delivery_status(
    id: i64,
    status: DeliveryStatusType,
    conn: &mut SqliteConnection,
) -> Result<Delivery, DeliveryApiError> {
    let result: Option<Delivery> = sqlx::query_as(
        r#"
            UPDATE deliveries
            SET status = $1,
                delivered_at = CASE WHEN $2 AND delivered_at IS NULL THEN CURRENT_TIMESTAMP ELSE delivered_at END
            WHERE id = $3
            RETURNING *;
        "#,
    )
    .bind(status)
    .bind(status == DeliveryStatusType::Delivered)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(DeliveryApiError::DeliveryNotFound(id))
}

pub(crate) async fn set_customer_verified(id: i64, conn: &mut SqliteConnection) -> Result<Delivery, DeliveryApiError> {
    let result: Option<Delivery> =
        sqlx::query_as("UPDATE deliveries SET customer_verified = 1 WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(DeliveryApiError::DeliveryNotFound(id))
}
