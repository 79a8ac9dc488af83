use log::{debug, trace};
use mesob_common::Birr;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatusType, PaymentStatusType},
    order_objects::OrderQueryFilter,
    sqlite::db::menu,
    traits::OrderApiError,
};

/// Creates an order together with its line items against the given connection. This is not
/// atomic by itself. Wrap the call in a transaction and pass `&mut tx` as the connection to get
/// all-or-nothing behaviour.
///
/// Items are validated and priced against the menu before anything is written, so the first bad
/// item aborts the whole order.
pub async fn create_full_order(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, Vec<OrderItem>), OrderApiError> {
    if order.items.is_empty() {
        return Err(OrderApiError::ValidationError("an order needs at least one item".to_string()));
    }
    let mut priced = Vec::with_capacity(order.items.len());
    for req in &order.items {
        if req.quantity < 1 {
            return Err(OrderApiError::ValidationError(format!(
                "quantity for menu item {} must be at least 1",
                req.menu_item_id
            )));
        }
        let item = menu::fetch_menu_item(req.menu_item_id, conn)
            .await?
            .ok_or(OrderApiError::MenuItemNotFound(req.menu_item_id))?;
        if !item.available {
            return Err(OrderApiError::MenuItemUnavailable(item.name));
        }
        priced.push((req.menu_item_id, item.name, item.price, req.quantity));
    }
    let total = priced.iter().map(|(_, _, price, qty)| *price * *qty).sum::<Birr>();
    let new_order = insert_order(&order, total, conn).await?;
    let mut items = Vec::with_capacity(priced.len());
    for (menu_item_id, name, price, quantity) in priced {
        let item = insert_order_item(new_order.id, menu_item_id, &name, price, quantity, conn).await?;
        items.push(item);
    }
    debug!(
        "📝️ Order {} created for customer {}. {} line(s), total {total}",
        new_order.id,
        new_order.customer_id,
        items.len()
    );
    Ok((new_order, items))
}

async fn insert_order(order: &NewOrder, total_price: Birr, conn: &mut SqliteConnection) -> Result<Order, OrderApiError> {
    // Cash settles on the spot. The order itself still starts pending until the kitchen
    // accepts it; gateway orders additionally wait for their payment to be confirmed.
    let payment_status =
        if order.payment_method.uses_gateway() { PaymentStatusType::Pending } else { PaymentStatusType::Success };
    let status = OrderStatusType::Pending;
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                customer_id,
                total_price,
                status,
                payment_status,
                payment_method,
                campus,
                building,
                room_number
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(order.customer_id)
    .bind(total_price)
    .bind(status)
    .bind(payment_status)
    .bind(order.payment_method)
    .bind(order.campus)
    .bind(&order.building)
    .bind(&order.room_number)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

async fn insert_order_item(
    order_id: i64,
    menu_item_id: i64,
    name: &str,
    price_at_purchase: Birr,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, OrderApiError> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, menu_item_id, name, price_at_purchase, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(menu_item_id)
    .bind(name)
    .bind(price_at_purchase)
    .bind(quantity)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn fetch_order(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_order_by_reference(reference: &str, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE payment_ref = $1").bind(reference).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches orders according to the criteria specified in the `OrderQueryFilter`.
///
/// Resulting orders are sorted by `created_at`, oldest first unless the filter says otherwise.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
    SELECT * FROM orders
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(cid) = query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if query.payment_status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.payment_status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<String>>().join(",");
        where_clause.push(format!("payment_status IN ({statuses})"));
    }
    if let Some(method) = query.payment_method {
        where_clause.push("payment_method = ");
        where_clause.push_bind_unseparated(method);
    }
    if query.with_reference_only {
        where_clause.push("payment_ref IS NOT NULL");
    }
    if query.newest_first {
        builder.push(" ORDER BY created_at DESC, id DESC");
    } else {
        builder.push(" ORDER BY created_at ASC, id ASC");
    }

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

pub(crate) async fn update_order_status(
    id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderApiError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(OrderApiError::OrderNotFound(id))
}

pub(crate) async fn set_payment_reference(
    id: i64,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderApiError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET payment_ref = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(reference)
            .bind(id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(OrderApiError::OrderNotFound(id))
}

pub(crate) async fn set_payment_status(
    id: i64,
    status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderApiError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(status)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    result.ok_or(OrderApiError::OrderNotFound(id))
}
