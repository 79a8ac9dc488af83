use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{CartItem, CartItemRequest, Customer, NewCustomer},
    sqlite::db::menu,
    traits::CustomerApiError,
};

pub(crate) async fn insert_customer(customer: NewCustomer, conn: &mut SqliteConnection) -> Result<Customer, CustomerApiError> {
    let result: Result<Customer, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO customers (name, email, phone, password_hash, campus)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, phone, campus, created_at;
        "#,
    )
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(&customer.phone)
    .bind(&customer.password_hash)
    .bind(customer.campus)
    .fetch_one(conn)
    .await;
    match result {
        Ok(customer) => {
            debug!("🧑️ New customer registered");
            Ok(customer)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(CustomerApiError::EmailTaken(customer.email))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_customer(id: i64, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    let customer = sqlx::query_as("SELECT id, name, email, phone, campus, created_at FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(customer)
}

pub async fn fetch_customers(conn: &mut SqliteConnection) -> Result<Vec<Customer>, sqlx::Error> {
    let customers = sqlx::query_as("SELECT id, name, email, phone, campus, created_at FROM customers ORDER BY id")
        .fetch_all(conn)
        .await?;
    Ok(customers)
}

pub async fn cart_for_customer(customer_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM cart_items WHERE customer_id = $1 ORDER BY id")
        .bind(customer_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Replaces the saved cart wholesale. Not atomic by itself; wrap in a transaction.
pub(crate) async fn replace_cart(
    customer_id: i64,
    items: Vec<CartItemRequest>,
    conn: &mut SqliteConnection,
) -> Result<Vec<CartItem>, CustomerApiError> {
    if fetch_customer(customer_id, conn).await?.is_none() {
        return Err(CustomerApiError::CustomerNotFound(customer_id));
    }
    for item in &items {
        if item.quantity < 1 {
            return Err(CustomerApiError::ValidationError(format!(
                "quantity for menu item {} must be at least 1",
                item.menu_item_id
            )));
        }
        if menu::fetch_menu_item(item.menu_item_id, conn).await?.is_none() {
            return Err(CustomerApiError::MenuItemNotFound(item.menu_item_id));
        }
    }
    clear_cart(customer_id, conn).await?;
    let mut cart = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query_as(
            r#"
                INSERT INTO cart_items (customer_id, menu_item_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (customer_id, menu_item_id) DO UPDATE SET quantity = quantity + excluded.quantity
                RETURNING *;
            "#,
        )
        .bind(customer_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .fetch_one(&mut *conn)
        .await?;
        cart.push(row);
    }
    debug!("🧑️ Cart for customer {customer_id} replaced. {} line(s)", cart.len());
    Ok(cart)
}

pub(crate) async fn clear_cart(customer_id: i64, conn: &mut SqliteConnection) -> Result<(), CustomerApiError> {
    sqlx::query("DELETE FROM cart_items WHERE customer_id = $1").bind(customer_id).execute(conn).await?;
    Ok(())
}
