use thiserror::Error;

use crate::db_types::{CartItem, CartItemRequest, Customer, NewCustomer, OrderHistoryEntry};

#[derive(Debug, Clone, Error)]
pub enum CustomerApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested customer, {0}, does not exist")]
    CustomerNotFound(i64),
    #[error("A customer with email {0} already exists")]
    EmailTaken(String),
    #[error("The requested menu item, {0}, does not exist")]
    MenuItemNotFound(i64),
    #[error("Invalid cart: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for CustomerApiError {
    fn from(e: sqlx::Error) -> Self {
        CustomerApiError::DatabaseError(e.to_string())
    }
}

/// Customer registration, the saved cart, and the per-customer order history view.
///
/// The history is a denormalised projection of the orders table. Order flows refresh it on a
/// best-effort basis, so it can drift; [`rebuild_history`] recomputes it from the orders table
/// whenever that happens.
#[allow(async_fn_in_trait)]
pub trait CustomerManagement {
    /// Registers a new customer. The email must be unique across customers.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;

    async fn fetch_customer(&self, id: i64) -> Result<Option<Customer>, CustomerApiError>;

    async fn fetch_customers(&self) -> Result<Vec<Customer>, CustomerApiError>;

    async fn cart_for_customer(&self, customer_id: i64) -> Result<Vec<CartItem>, CustomerApiError>;

    /// Replaces the customer's saved cart wholesale. Every entry must reference an existing menu
    /// item and carry a quantity of at least one.
    async fn replace_cart(&self, customer_id: i64, items: Vec<CartItemRequest>) -> Result<Vec<CartItem>, CustomerApiError>;

    async fn clear_cart(&self, customer_id: i64) -> Result<(), CustomerApiError>;

    /// The customer's order history, newest first.
    async fn history_for_customer(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError>;

    /// Drops the customer's history rows and regenerates them from the orders table.
    async fn rebuild_history(&self, customer_id: i64) -> Result<Vec<OrderHistoryEntry>, CustomerApiError>;
}
