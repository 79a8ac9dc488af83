use thiserror::Error;

use crate::db_types::{MenuItem, MenuItemUpdate, NewMenuItem};

#[derive(Debug, Clone, Error)]
pub enum MenuApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested menu item, {0}, does not exist")]
    MenuItemNotFound(i64),
    #[error("Invalid menu item: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for MenuApiError {
    fn from(e: sqlx::Error) -> Self {
        MenuApiError::DatabaseError(e.to_string())
    }
}

/// CRUD over the restaurant's menu. Orders snapshot name and price at purchase time, so editing
/// or deleting an item here never rewrites history.
#[allow(async_fn_in_trait)]
pub trait MenuManagement {
    async fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuApiError>;

    async fn fetch_menu_item(&self, id: i64) -> Result<Option<MenuItem>, MenuApiError>;

    /// Fetches the menu. With `only_available` set, items toggled off are filtered out, which is
    /// what customers see.
    async fn fetch_menu_items(&self, only_available: bool) -> Result<Vec<MenuItem>, MenuApiError>;

    /// Applies a partial update. Fields that are `None` keep their current value. An update with
    /// no fields set is rejected.
    async fn update_menu_item(&self, id: i64, update: MenuItemUpdate) -> Result<MenuItem, MenuApiError>;

    async fn delete_menu_item(&self, id: i64) -> Result<(), MenuApiError>;
}
