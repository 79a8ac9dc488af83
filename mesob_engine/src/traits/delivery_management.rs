use thiserror::Error;

use crate::{
    db_types::{Campus, Delivery, DeliveryPerson, DeliveryStatusType, NewDelivery, NewDeliveryPerson},
    delivery_objects::DeliveryQueryFilter,
    traits::OrderApiError,
};

#[derive(Debug, Clone, Error)]
pub enum DeliveryApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested order, {0}, does not exist")]
    OrderNotFound(i64),
    #[error("The requested delivery, {0}, does not exist")]
    DeliveryNotFound(i64),
    #[error("The requested delivery person, {0}, does not exist")]
    PersonNotFound(i64),
    #[error("Order {0} must be paid and in progress before it can be assigned")]
    OrderNotReady(i64),
    #[error("Order is for {order} campus but the delivery person works {person} campus")]
    CampusMismatch { order: Campus, person: Campus },
    #[error("Order {0} already has a delivery assigned")]
    AlreadyAssigned(i64),
    #[error("Delivery {0} has not been marked delivered yet")]
    NotDelivered(i64),
    #[error("A delivery person with email {0} already exists")]
    EmailTaken(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for DeliveryApiError {
    fn from(e: sqlx::Error) -> Self {
        DeliveryApiError::DatabaseError(e.to_string())
    }
}

impl From<OrderApiError> for DeliveryApiError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::OrderNotFound(id) => DeliveryApiError::OrderNotFound(id),
            e => DeliveryApiError::DatabaseError(e.to_string()),
        }
    }
}

/// The `DeliveryManagement` trait defines behaviour for assigning paid orders to delivery
/// persons and tracking each delivery to the customer's hand.
///
/// Assignment is where most of the business rules live. [`create_delivery`] checks, in order:
/// 1. the order exists,
/// 2. the order is paid (`verified` or `success`) and `inProgress`,
/// 3. the delivery person exists,
/// 4. the delivery person works the order's campus,
/// 5. no delivery exists for the order yet.
///
/// The first failing check decides the error, so a caller assigning an unpaid order on the wrong
/// campus hears about the payment, not the campus. The duplicate check is backed by a unique
/// index on the order id, so two racing assignments cannot both succeed; the loser surfaces as
/// [`DeliveryApiError::AlreadyAssigned`].
#[allow(async_fn_in_trait)]
pub trait DeliveryManagement {
    /// Assigns an order to a delivery person, subject to the checks above. On success the new
    /// delivery is `pending`, unverified, and the order is moved to `completed`.
    async fn create_delivery(&self, delivery: NewDelivery) -> Result<Delivery, DeliveryApiError>;

    async fn fetch_delivery(&self, id: i64) -> Result<Option<Delivery>, DeliveryApiError>;

    /// Searches deliveries. Results are newest-first.
    async fn search_deliveries(&self, query: DeliveryQueryFilter) -> Result<Vec<Delivery>, DeliveryApiError>;

    /// Sets the delivery status. The transition to `delivered` stamps `delivered_at` once;
    /// any other transition, including moving away from `delivered`, leaves the stamp alone.
    async fn update_delivery_status(&self, id: i64, status: DeliveryStatusType) -> Result<Delivery, DeliveryApiError>;

    /// Records the customer's confirmation of receipt. The delivery must already be `delivered`.
    /// Confirming twice is a no-op, not an error.
    async fn verify_delivery(&self, id: i64) -> Result<Delivery, DeliveryApiError>;

    /// Registers a new delivery person. The campus is fixed here; there is no way to move a
    /// person to another campus later.
    async fn insert_delivery_person(&self, person: NewDeliveryPerson) -> Result<DeliveryPerson, DeliveryApiError>;

    async fn fetch_delivery_person(&self, id: i64) -> Result<Option<DeliveryPerson>, DeliveryApiError>;

    async fn fetch_delivery_persons(&self) -> Result<Vec<DeliveryPerson>, DeliveryApiError>;

    /// Removes a delivery person. Their past deliveries are kept.
    async fn delete_delivery_person(&self, id: i64) -> Result<(), DeliveryApiError>;
}
