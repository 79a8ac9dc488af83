use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{Order, OrderHistoryEntry};

/// Refreshes the history row for this order, creating it if needed. Order flows call this on a
/// best-effort basis after the main write commits, so failures here are logged and swallowed by
/// the caller rather than failing the order.
pub(crate) async fn upsert_from_order(order: &Order, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO order_history (customer_id, order_id, total_price, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO UPDATE
            SET status = excluded.status, total_price = excluded.total_price, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(order.customer_id)
    .bind(order.id)
    .bind(order.total_price)
    .bind(order.status)
    .execute(conn)
    .await?;
    trace!("🧑️ History row refreshed for order {}", order.id);
    Ok(())
}

pub async fn history_for_customer(
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderHistoryEntry>, sqlx::Error> {
    let entries =
        sqlx::query_as("SELECT * FROM order_history WHERE customer_id = $1 ORDER BY order_id DESC")
            .bind(customer_id)
            .fetch_all(conn)
            .await?;
    Ok(entries)
}

/// Drops the customer's history rows and regenerates them from the orders table. Not atomic by
/// itself; wrap in a transaction.
pub(crate) async fn rebuild_for_customer(
    customer_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderHistoryEntry>, sqlx::Error> {
    sqlx::query("DELETE FROM order_history WHERE customer_id = $1").bind(customer_id).execute(&mut *conn).await?;
    sqlx::query(
        r#"
            INSERT INTO order_history (customer_id, order_id, total_price, status)
            SELECT customer_id, id, total_price, status FROM orders WHERE customer_id = $1;
        "#,
    )
    .bind(customer_id)
    .execute(&mut *conn)
    .await?;
    history_for_customer(customer_id, conn).await
}
