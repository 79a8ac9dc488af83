//! Unified API for maintaining the menu.

use std::fmt::Debug;

use crate::{
    db_types::{MenuItem, MenuItemUpdate, NewMenuItem},
    traits::{MenuApiError, MenuManagement},
};

pub struct MenuApi<B> {
    db: B,
}

impl<B: Debug> Debug for MenuApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MenuApi ({:?})", self.db)
    }
}

impl<B> MenuApi<B>
where B: MenuManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn add_item(&self, item: NewMenuItem) -> Result<MenuItem, MenuApiError> {
        self.db.insert_menu_item(item).await
    }

    pub async fn item_by_id(&self, id: i64) -> Result<Option<MenuItem>, MenuApiError> {
        self.db.fetch_menu_item(id).await
    }

    /// The full menu for staff, or only what customers may order right now.
    pub async fn items(&self, only_available: bool) -> Result<Vec<MenuItem>, MenuApiError> {
        self.db.fetch_menu_items(only_available).await
    }

    pub async fn update_item(&self, id: i64, update: MenuItemUpdate) -> Result<MenuItem, MenuApiError> {
        self.db.update_menu_item(id, update).await
    }

    pub async fn set_availability(&self, id: i64, available: bool) -> Result<MenuItem, MenuApiError> {
        let update = MenuItemUpdate { available: Some(available), ..MenuItemUpdate::default() };
        self.db.update_menu_item(id, update).await
    }

    pub async fn remove_item(&self, id: i64) -> Result<(), MenuApiError> {
        self.db.delete_menu_item(id).await
    }
}
