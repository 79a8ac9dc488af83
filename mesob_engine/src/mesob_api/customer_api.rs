//! Unified API for customer accounts, carts and order history.

use std::fmt::Debug;

use crate::{
    db_types::{CartItem, CartItemRequest, Customer, NewCustomer, OrderHistoryEntry},
    traits::{CustomerApiError, CustomerManagement},
};

pub struct CustomerApi<B> {
    db: B,
}

impl<B: Debug> Debug for CustomerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomerApi ({:?})", self.db)
    }
}

impl<B> CustomerApi<B>
where B: CustomerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn register(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        self.db.insert_customer(customer).await
    }

    pub async fn customer_by_id(&self, id: i64) -> Result<Option<Customer>, CustomerApiError> {
        self.db.fetch_customer(id).await
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, CustomerApiError> {
        self.db.fetch_customers().await
    }

    pub async fn cart(&self, customer_id: i64) -> Result<Vec<CartItem>, CustomerApiError> {
        self.db.cart_for_customer(customer_id).await
    }

    pub async fn replace_cart(&self, customer_id: i64, items: Vec<CartItemRequest>) -> Result<Vec<CartItem>, CustomerApiError> {
        self.db.replace_cart(customer_id, items).await
    }

    pub async fn clear_cart(&self, customer_id: i64) -> Result<(), CustomerApiError> {
        self.db.clear_cart(customer_id).await
    }

    pub async fn history(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError> {
        self.db.history_for_customer(customer_id).await
    }

    /// Regenerates the denormalised history from the orders table. Use this when the best-effort
    /// sync has been missed.
    pub async fn rebuild_history(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError> {
        self.db.rebuild_history(customer_id).await
    }
}
