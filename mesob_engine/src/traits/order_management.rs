use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderItem, OrderStatusType, PaymentStatusType},
    order_objects::OrderQueryFilter,
    traits::MenuApiError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested order, {0}, does not exist")]
    OrderNotFound(i64),
    #[error("The requested menu item, {0}, does not exist")]
    MenuItemNotFound(i64),
    #[error("The menu item '{0}' is not available right now")]
    MenuItemUnavailable(String),
    #[error("Invalid order: {0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

impl From<MenuApiError> for OrderApiError {
    fn from(e: MenuApiError) -> Self {
        match e {
            MenuApiError::MenuItemNotFound(id) => OrderApiError::MenuItemNotFound(id),
            MenuApiError::ValidationError(msg) => OrderApiError::ValidationError(msg),
            MenuApiError::DatabaseError(msg) => OrderApiError::DatabaseError(msg),
        }
    }
}

/// The `OrderManagement` trait defines behaviour for creating orders and walking them through the
/// order lifecycle (`pending` → `inProgress` → `completed`, or `cancelled`).
///
/// Pricing is the store's job, not the caller's: an order request carries menu item ids and
/// quantities only, and the backend snapshots names and unit prices from the menu inside the same
/// transaction that creates the order. The total is fixed at that moment and never recomputed.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Creates a new order, atomically with its line items.
    ///
    /// Every item must reference an existing, available menu item and carry a quantity of at
    /// least one; otherwise nothing is written. Orders start out `pending`. Cash orders settle
    /// their payment immediately (payment status `success`); gateway orders also start with a
    /// `pending` payment.
    async fn create_order(&self, order: NewOrder) -> Result<(Order, Vec<OrderItem>), OrderApiError>;

    /// Fetches the order with the given id, or `None` if it does not exist.
    async fn fetch_order(&self, id: i64) -> Result<Option<Order>, OrderApiError>;

    /// Fetches the line items for an order. An unknown order id yields an empty list.
    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError>;

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderApiError>;

    /// Sets the order status to `status`, unconditionally. There is no transition check here;
    /// staff use this to move orders back as well as forward. Returns the updated order.
    async fn update_order_status(&self, id: i64, status: OrderStatusType) -> Result<Order, OrderApiError>;

    /// Records the gateway transaction reference for an order.
    async fn set_payment_reference(&self, id: i64, reference: &str) -> Result<Order, OrderApiError>;

    /// Looks up an order by its gateway transaction reference.
    async fn fetch_order_by_reference(&self, reference: &str) -> Result<Option<Order>, OrderApiError>;

    /// Marks the order's payment as settled (`verified` from the webhook, `success` from cash or
    /// the sweep) and nudges a `pending` order into `inProgress`. Orders already past `pending`
    /// keep their status. The customer's order history row is refreshed on a best-effort basis.
    async fn settle_order_payment(&self, id: i64, status: PaymentStatusType) -> Result<Order, OrderApiError>;

    /// Marks the order's payment as `failed`. The order status is left alone so the customer can
    /// retry payment.
    async fn mark_payment_failed(&self, id: i64) -> Result<Order, OrderApiError>;
}
