use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{MenuItem, MenuItemUpdate, NewMenuItem},
    traits::MenuApiError,
};

pub(crate) async fn insert_menu_item(item: NewMenuItem, conn: &mut SqliteConnection) -> Result<MenuItem, MenuApiError> {
    let item: MenuItem = sqlx::query_as(
        r#"
            INSERT INTO menu_items (name, description, price, available, category, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(item.available)
    .bind(Json(&item.category))
    .bind(&item.image_url)
    .fetch_one(conn)
    .await?;
    debug!("🍲️ Menu item '{}' added with id {}", item.name, item.id);
    Ok(item)
}

pub async fn fetch_menu_item(id: i64, conn: &mut SqliteConnection) -> Result<Option<MenuItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(item)
}

pub async fn fetch_menu_items(only_available: bool, conn: &mut SqliteConnection) -> Result<Vec<MenuItem>, sqlx::Error> {
    let sql = if only_available {
        "SELECT * FROM menu_items WHERE available = 1 ORDER BY id"
    } else {
        "SELECT * FROM menu_items ORDER BY id"
    };
    let items = sqlx::query_as(sql).fetch_all(conn).await?;
    Ok(items)
}

pub(crate) async fn update_menu_item(
    id: i64,
    update: MenuItemUpdate,
    conn: &mut SqliteConnection,
) -> Result<MenuItem, MenuApiError> {
    if update.is_empty() {
        debug!("🍲️ No fields to update for menu item {id}. Update request skipped.");
        return Err(MenuApiError::ValidationError("no fields to update".to_string()));
    }
    let mut builder = QueryBuilder::new("UPDATE menu_items SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(available) = update.available {
        set_clause.push("available = ");
        set_clause.push_bind_unseparated(available);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(Json(category));
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🍲️ Executing query: {}", builder.sql());
    let item = builder.build_query_as::<MenuItem>().fetch_optional(conn).await?;
    item.ok_or(MenuApiError::MenuItemNotFound(id))
}

/// Deletes the menu item. Order lines keep their name and price snapshots, so past orders are
/// unaffected.
pub(crate) async fn delete_menu_item(id: i64, conn: &mut SqliteConnection) -> Result<(), MenuApiError> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(MenuApiError::MenuItemNotFound(id));
    }
    debug!("🍲️ Menu item {id} removed");
    Ok(())
}
